//! Auto-increment emulation with a sequence and a BEFORE INSERT trigger.
//!
//! Oracle versions this crate targets have no portable identity column, so
//! an auto-increment column `c` of table `t` is backed by sequence
//! `SQ_t_c` and trigger `TR_t_c`. Both names are derived, never stored.

use tracing::{debug, info};

use crate::catalog::{CatalogReader, TriggerRow};
use crate::core::identifier::{contains_ignore_case, contains_name, names_equal};
use crate::core::traits::QueryEngine;
use crate::ddl;
use crate::error::Result;

pub fn sequence_name(table: &str, column: &str) -> String {
    format!("SQ_{}_{}", table, column)
}

pub fn trigger_name(table: &str, column: &str) -> String {
    format!("TR_{}_{}", table, column)
}

/// What [`ensure_auto_increment`] actually created.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AutoIncrementApplied {
    /// Sequence created by this call.
    pub sequence: Option<String>,
    /// Trigger created by this call.
    pub trigger: Option<String>,
}

impl AutoIncrementApplied {
    /// Number of statements executed: 0, 1 or 2.
    pub fn count(&self) -> usize {
        usize::from(self.sequence.is_some()) + usize::from(self.trigger.is_some())
    }
}

/// Create the sequence and trigger for `table.column` when missing.
///
/// Re-running on a configured column executes nothing.
pub async fn ensure_auto_increment<E: QueryEngine + ?Sized>(
    engine: &E,
    owner: &str,
    table: &str,
    column: &str,
) -> Result<AutoIncrementApplied> {
    let mut applied = AutoIncrementApplied::default();
    ensure_auto_increment_into(engine, owner, table, column, &mut applied).await?;
    Ok(applied)
}

/// Like [`ensure_auto_increment`], recording each object in `applied` as
/// soon as it exists so a caller still sees a sequence created before the
/// trigger failed.
pub async fn ensure_auto_increment_into<E: QueryEngine + ?Sized>(
    engine: &E,
    owner: &str,
    table: &str,
    column: &str,
    applied: &mut AutoIncrementApplied,
) -> Result<()> {
    let catalog = CatalogReader::new(engine);

    let sequence = sequence_name(table, column);
    let sequences = catalog.list_sequences(owner).await?;
    if !contains_name(&sequences, &sequence) {
        engine
            .execute_non_query(&ddl::build_create_sequence(&sequence))
            .await?;
        info!("Created sequence {}", sequence);
        applied.sequence = Some(sequence.clone());
    }

    let trigger = trigger_name(table, column);
    let triggers = catalog.list_auto_increment_triggers(owner, table).await?;
    if !triggers.iter().any(|t| names_equal(&t.trigger_name, &trigger)) {
        engine
            .execute_non_query(&ddl::build_create_trigger(&trigger, table, &sequence, column))
            .await?;
        info!("Created trigger {} on {}", trigger, table);
        applied.trigger = Some(trigger);
    }

    debug!(
        "Auto-increment for {}.{}: {} statement(s)",
        table,
        column,
        applied.count()
    );
    Ok(())
}

/// Drop the trigger and sequence of `table.column` when present.
///
/// Returns the number of objects dropped.
pub async fn drop_auto_increment<E: QueryEngine + ?Sized>(
    engine: &E,
    owner: &str,
    table: &str,
    column: &str,
) -> Result<usize> {
    let catalog = CatalogReader::new(engine);
    let mut dropped = 0;

    let trigger = trigger_name(table, column);
    let triggers = catalog.list_auto_increment_triggers(owner, table).await?;
    if let Some(existing) = triggers.iter().find(|t| names_equal(&t.trigger_name, &trigger)) {
        engine
            .execute_non_query(&ddl::build_drop_trigger(&existing.trigger_name))
            .await?;
        info!("Dropped trigger {}", existing.trigger_name);
        dropped += 1;
    }

    let sequence = sequence_name(table, column);
    let sequences = catalog.list_sequences(owner).await?;
    if let Some(existing) = sequences.iter().find(|s| names_equal(s, &sequence)) {
        engine
            .execute_non_query(&ddl::build_drop_sequence(existing))
            .await?;
        info!("Dropped sequence {}", existing);
        dropped += 1;
    }

    Ok(dropped)
}

/// Whether `table.column` is backed by a working sequence + trigger pair.
///
/// All of these must hold: the conventional trigger is among the table's
/// INSERT triggers, its body names the conventional sequence and the
/// column, and the sequence exists.
pub fn is_auto_increment<S: AsRef<str>>(
    table: &str,
    column: &str,
    triggers: &[TriggerRow],
    sequences: &[S],
) -> bool {
    let trigger = trigger_name(table, column);
    let Some(row) = triggers.iter().find(|t| names_equal(&t.trigger_name, &trigger)) else {
        return false;
    };

    let sequence = sequence_name(table, column);
    contains_ignore_case(&row.trigger_body, &sequence)
        && contains_ignore_case(&row.trigger_body, column)
        && contains_name(sequences, &sequence)
}
