use crate::core::classify::InstanceCounts;
use crate::core::{LimitKey, LimitTotals, LimitValue, Printer, UsageReport};
use crate::utils::error::{Result, UsageError};
use crate::utils::units::format_byte_size_iec;
use std::collections::HashMap;

/// Renders byte totals with binary units (`"1.5GiB"`).
#[derive(Debug, Clone, Copy)]
pub struct ByteSizePrinter {
    precision: usize,
}

impl ByteSizePrinter {
    pub fn new(precision: usize) -> Self {
        Self { precision }
    }
}

impl Default for ByteSizePrinter {
    fn default() -> Self {
        Self::new(1)
    }
}

impl Printer for ByteSizePrinter {
    fn format(&self, value: LimitValue) -> String {
        match value {
            LimitValue::Bytes(bytes) => format_byte_size_iec(bytes, self.precision),
            // a count carries no unit
            LimitValue::Count(count) => count.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CountPrinter;

impl Printer for CountPrinter {
    fn format(&self, value: LimitValue) -> String {
        match value {
            LimitValue::Count(count) | LimitValue::Bytes(count) => count.to_string(),
        }
    }
}

/// Printers keyed by limit. Built once and handed to the formatter, never mutated afterwards.
pub struct PrinterRegistry {
    printers: HashMap<LimitKey, Box<dyn Printer>>,
}

impl PrinterRegistry {
    pub fn empty() -> Self {
        Self {
            printers: HashMap::new(),
        }
    }

    pub fn with_printer(mut self, key: LimitKey, printer: impl Printer + 'static) -> Self {
        self.printers.insert(key, Box::new(printer));
        self
    }

    pub fn printer(&self, key: LimitKey) -> Result<&dyn Printer> {
        self.printers
            .get(&key)
            .map(|printer| &**printer)
            .ok_or_else(|| UsageError::MissingPrinter {
                key: key.to_string(),
            })
    }

    pub fn format(&self, key: LimitKey, value: LimitValue) -> Result<String> {
        Ok(self.printer(key)?.format(value))
    }
}

impl Default for PrinterRegistry {
    fn default() -> Self {
        Self::empty()
            .with_printer(LimitKey::Memory, ByteSizePrinter::default())
            .with_printer(LimitKey::Disk, ByteSizePrinter::default())
            .with_printer(LimitKey::Cpu, CountPrinter)
            .with_printer(LimitKey::Processes, CountPrinter)
    }
}

impl std::fmt::Debug for PrinterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<_> = self.printers.keys().collect();
        keys.sort();
        f.debug_struct("PrinterRegistry").field("keys", &keys).finish()
    }
}

#[derive(Debug, Default)]
pub struct ReportFormatter {
    registry: PrinterRegistry,
}

impl ReportFormatter {
    pub fn new(registry: PrinterRegistry) -> Self {
        Self { registry }
    }

    /// Builds the final report. All printers are resolved before the report is filled.
    pub fn format(
        &self,
        totals: &LimitTotals,
        disk_bytes: i64,
        counts: InstanceCounts,
    ) -> Result<UsageReport> {
        let total = |key: LimitKey| totals.get(&key).copied().unwrap_or_else(|| key.zero());

        let cpu = self.registry.format(LimitKey::Cpu, total(LimitKey::Cpu))?;
        let memory = self.registry.format(LimitKey::Memory, total(LimitKey::Memory))?;
        let processes = self
            .registry
            .format(LimitKey::Processes, total(LimitKey::Processes))?;
        let disk = self
            .registry
            .format(LimitKey::Disk, LimitValue::Bytes(disk_bytes))?;

        let mut report = UsageReport::default();
        report.set("cpu", cpu);
        report.set("memory", memory);
        report.set("processes", processes);
        report.set("containers", counts.containers.to_string());
        report.set("virtual-machines", counts.virtual_machines.to_string());
        report.set("disk", disk);

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn totals() -> LimitTotals {
        let mut totals = LimitTotals::new();
        totals.insert(LimitKey::Memory, LimitValue::Bytes(3 << 30));
        totals.insert(LimitKey::Cpu, LimitValue::Count(6));
        totals.insert(LimitKey::Processes, LimitValue::Count(500));
        totals
    }

    #[test]
    fn test_default_printers() {
        let registry = PrinterRegistry::default();
        assert_eq!(
            registry.format(LimitKey::Memory, LimitValue::Bytes(1536)).unwrap(),
            "1.5KiB"
        );
        assert_eq!(
            registry.format(LimitKey::Cpu, LimitValue::Count(4)).unwrap(),
            "4"
        );
        assert_eq!(
            registry.format(LimitKey::Disk, LimitValue::Bytes(512)).unwrap(),
            "512B"
        );
    }

    #[test]
    fn test_formats_full_report() {
        let formatter = ReportFormatter::default();
        let counts = InstanceCounts {
            containers: 2,
            virtual_machines: 1,
        };

        let report = formatter.format(&totals(), 8_000_000_000, counts).unwrap();

        assert_eq!(report.get("memory"), Some("3.0GiB"));
        assert_eq!(report.get("cpu"), Some("6"));
        assert_eq!(report.get("processes"), Some("500"));
        assert_eq!(report.get("containers"), Some("2"));
        assert_eq!(report.get("virtual-machines"), Some("1"));
        assert_eq!(report.get("disk"), Some("7.5GiB"));
        assert_eq!(report.get("networks"), Some("0"));
    }

    #[test]
    fn test_missing_totals_render_as_zero() {
        let report = ReportFormatter::default()
            .format(&LimitTotals::new(), 0, InstanceCounts::default())
            .unwrap();
        assert_eq!(report, {
            let mut expected = UsageReport::default();
            expected.set("memory", "0B".to_string());
            expected.set("disk", "0B".to_string());
            expected
        });
    }

    #[test]
    fn test_missing_printer_is_an_error() {
        let registry = PrinterRegistry::empty()
            .with_printer(LimitKey::Cpu, CountPrinter)
            .with_printer(LimitKey::Memory, ByteSizePrinter::default())
            .with_printer(LimitKey::Processes, CountPrinter);
        let formatter = ReportFormatter::new(registry);

        let err = formatter
            .format(&totals(), 10, InstanceCounts::default())
            .unwrap_err();
        assert!(matches!(err, UsageError::MissingPrinter { ref key } if key == "limits.disk"));
    }

    struct ShoutingPrinter;

    impl Printer for ShoutingPrinter {
        fn format(&self, value: LimitValue) -> String {
            match value {
                LimitValue::Count(n) => format!("{} CPUS", n),
                LimitValue::Bytes(n) => format!("{} BYTES", n),
            }
        }
    }

    #[test]
    fn test_custom_printer_is_used() {
        let registry = PrinterRegistry::default().with_printer(LimitKey::Cpu, ShoutingPrinter);
        let report = ReportFormatter::new(registry)
            .format(&totals(), 0, InstanceCounts::default())
            .unwrap();
        assert_eq!(report.get("cpu"), Some("6 CPUS"));
    }
}
