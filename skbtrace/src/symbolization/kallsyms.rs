use log::{info, warn};
use rustc_demangle::try_demangle;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use super::Arch;
use crate::domain::SetupError;

/// Kernel symbol table built from `/proc/kallsyms`
///
/// Loaded once before the first event and never modified afterwards. Keyed
/// by address so the same table serves exact lookups (function column) and
/// nearest-below lookups (stack frames).
#[derive(Debug, Default)]
pub struct KernelSymbols {
    by_addr: BTreeMap<u64, String>,
    /// Every parsed address was zero (`kptr_restrict` hides them)
    restricted: bool,
}

impl KernelSymbols {
    /// Load and parse a kallsyms file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or contains no text symbols
    pub fn load<P: AsRef<Path>>(path: P, demangle: bool) -> Result<Self, SetupError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| {
            SetupError::KallsymsReadFailed { path: path.to_path_buf(), source }
        })?;

        let symbols = Self::parse(&content, demangle);
        if symbols.is_empty() {
            return Err(SetupError::KallsymsEmpty(path.to_path_buf()));
        }

        info!("Loaded {} kernel symbols from {}", symbols.len(), path.display());
        if symbols.restricted {
            warn!(
                "All symbol addresses in {} are zero (kptr_restrict?), functions will show as addresses",
                path.display()
            );
        }

        Ok(symbols)
    }

    /// Parse kallsyms text
    ///
    /// Line format: `ADDR TYPE NAME [MODULE]`. Only text symbols (`t`, `T`,
    /// `w`, `W`) are kept. When several names share an address the first one
    /// wins.
    #[must_use]
    pub fn parse(content: &str, demangle: bool) -> Self {
        let mut by_addr = BTreeMap::new();
        let mut nonzero = false;

        for line in content.lines() {
            let mut parts = line.split_whitespace();
            let (Some(addr), Some(kind), Some(name)) = (parts.next(), parts.next(), parts.next())
            else {
                continue;
            };

            if !matches!(kind, "t" | "T" | "w" | "W") {
                continue;
            }

            let Ok(addr) = u64::from_str_radix(addr, 16) else {
                continue;
            };
            nonzero |= addr != 0;

            by_addr.entry(addr).or_insert_with(|| {
                if demangle {
                    demangle_symbol(name)
                } else {
                    name.to_string()
                }
            });
        }

        let restricted = !by_addr.is_empty() && !nonzero;
        Self { by_addr, restricted }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_addr.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_addr.is_empty()
    }

    /// Whether kallsyms hid every address
    #[must_use]
    pub fn is_restricted(&self) -> bool {
        self.restricted
    }

    /// Symbol starting exactly at `addr`
    #[must_use]
    pub fn exact(&self, addr: u64) -> Option<&str> {
        self.by_addr.get(&addr).map(String::as_str)
    }

    /// Symbol with the greatest address not exceeding `addr`
    #[must_use]
    pub fn nearest_below(&self, addr: u64) -> Option<&str> {
        self.by_addr.range(..=addr).next_back().map(|(_, name)| name.as_str())
    }

    /// Function name for a normalized probe address
    ///
    /// Tries the exact address, then (on architectures with a CFI landing pad)
    /// the address minus the pad, then falls back to the hex address.
    #[must_use]
    pub fn function_name(&self, arch: Arch, addr: u64) -> Cow<'_, str> {
        if let Some(name) = self.exact(addr) {
            return Cow::Borrowed(name);
        }

        if let Some(name) =
            arch.cfi_prologue().and_then(|offset| self.exact(addr.wrapping_sub(offset)))
        {
            return Cow::Borrowed(name);
        }

        Cow::Owned(format!("0x{addr:x}"))
    }

    /// Name for an arbitrary code address (stack frame), hex if none is below it
    #[must_use]
    pub fn frame_name(&self, addr: u64) -> Cow<'_, str> {
        self.nearest_below(addr)
            .map_or_else(|| Cow::Owned(format!("0x{addr:x}")), Cow::Borrowed)
    }
}

impl FromIterator<(u64, String)> for KernelSymbols {
    fn from_iter<I: IntoIterator<Item = (u64, String)>>(iter: I) -> Self {
        let mut by_addr = BTreeMap::new();
        for (addr, name) in iter {
            by_addr.entry(addr).or_insert(name);
        }
        Self { by_addr, restricted: false }
    }
}

/// Demangle a Rust-for-Linux symbol, leaving C symbols untouched
#[must_use]
pub fn demangle_symbol(symbol: &str) -> String {
    match try_demangle(symbol) {
        Ok(demangled) => format!("{demangled:#}"),
        Err(_) => symbol.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
ffffffff81000000 T _stext
ffffffff81000000 T _text
ffffffff81001000 t ip_rcv_core
ffffffff81002000 T ip_rcv
ffffffff81003000 D init_net
ffffffff81004000 W arch_cpu_idle
ffffffffc0a01000 t nf_hook_slow\t[nf_tables]
garbage line
";

    #[test]
    fn test_parse_keeps_text_symbols() {
        let symbols = KernelSymbols::parse(SAMPLE, false);

        assert_eq!(symbols.len(), 5);
        assert_eq!(symbols.exact(0xffff_ffff_8100_2000), Some("ip_rcv"));
        assert_eq!(symbols.exact(0xffff_ffff_8100_4000), Some("arch_cpu_idle"));
        assert_eq!(symbols.exact(0xffff_ffff_c0a0_1000), Some("nf_hook_slow"));
        // Data symbol skipped
        assert_eq!(symbols.exact(0xffff_ffff_8100_3000), None);
        assert!(!symbols.is_restricted());
    }

    #[test]
    fn test_parse_first_name_wins() {
        let symbols = KernelSymbols::parse(SAMPLE, false);
        assert_eq!(symbols.exact(0xffff_ffff_8100_0000), Some("_stext"));
    }

    #[test]
    fn test_parse_detects_restricted_addresses() {
        let content = "0000000000000000 T _stext\n0000000000000000 t ip_rcv\n";
        let symbols = KernelSymbols::parse(content, false);
        assert!(symbols.is_restricted());
        assert_eq!(symbols.len(), 1);
    }

    #[test]
    fn test_nearest_below() {
        let symbols = KernelSymbols::parse(SAMPLE, false);

        assert_eq!(symbols.nearest_below(0xffff_ffff_8100_2000), Some("ip_rcv"));
        assert_eq!(symbols.nearest_below(0xffff_ffff_8100_2abc), Some("ip_rcv"));
        assert_eq!(symbols.nearest_below(0xffff_ffff_8100_1fff), Some("ip_rcv_core"));
        assert_eq!(symbols.nearest_below(0x1000), None);
    }

    #[test]
    fn test_function_name_cfi_fallback_amd64() {
        let symbols: KernelSymbols = [(0x2000, "foo".to_string())].into_iter().collect();

        assert_eq!(symbols.function_name(Arch::Amd64, 0x2000), "foo");
        assert_eq!(symbols.function_name(Arch::Amd64, 0x2004), "foo");
        assert_eq!(symbols.function_name(Arch::Amd64, 0x2002), "0x2002");
    }

    #[test]
    fn test_function_name_no_cfi_fallback_arm64() {
        let symbols: KernelSymbols = [(0x2000, "foo".to_string())].into_iter().collect();

        assert_eq!(symbols.function_name(Arch::Arm64, 0x2000), "foo");
        assert_eq!(symbols.function_name(Arch::Arm64, 0x2004), "0x2004");
    }

    #[test]
    fn test_frame_name_hex_fallback() {
        let symbols: KernelSymbols = [(0x2000, "foo".to_string())].into_iter().collect();

        assert_eq!(symbols.frame_name(0x2fff), "foo");
        assert_eq!(symbols.frame_name(0x1fff), "0x1fff");
    }

    #[test]
    fn test_demangle_symbol() {
        assert_eq!(demangle_symbol("ip_rcv"), "ip_rcv");
        assert_eq!(
            demangle_symbol("_ZN4core3fmt5write17h0123456789abcdefE"),
            "core::fmt::write"
        );
    }

    #[test]
    fn test_load_missing_file() {
        let result = KernelSymbols::load("/nonexistent/kallsyms", false);
        assert!(matches!(result, Err(SetupError::KallsymsReadFailed { .. })));
    }
}
