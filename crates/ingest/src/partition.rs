use logvault_core::model::{LogEntry, LogRecord};

pub const DEFAULT_BATCH_SIZE: usize = 5000;

/// Splits incoming entries into fixed-size batches, stamping the owning
/// project id on every record. Pure and deterministic: batches preserve
/// arrival order, all batches hold `batch_size` records except possibly
/// the last.
pub fn partition(
    entries: Vec<LogEntry>,
    project_id: &str,
    batch_size: usize,
) -> Vec<Vec<LogRecord>> {
    let batch_size = batch_size.max(1);
    let mut batches = Vec::with_capacity(entries.len().div_ceil(batch_size));
    let mut current = Vec::with_capacity(batch_size.min(entries.len()));

    for entry in entries {
        current.push(entry.into_record(project_id));
        if current.len() == batch_size {
            batches.push(std::mem::replace(
                &mut current,
                Vec::with_capacity(batch_size),
            ));
        }
    }
    if !current.is_empty() {
        batches.push(current);
    }
    batches
}
