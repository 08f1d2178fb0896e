#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JournalEventKind {
    RunStarted,
    PositionOpened,
    PositionClosed,
    TapeExhausted,
    ConsumerDisconnected,
    RunFailed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalEvent {
    pub index: u64,
    pub kind: JournalEventKind,
    pub detail: Option<String>,
}

impl JournalEvent {
    pub fn new(index: u64, kind: JournalEventKind, detail: Option<String>) -> Self {
        Self {
            index,
            kind,
            detail,
        }
    }
}

pub trait JournalWriter {
    fn write(&mut self, event: JournalEvent);
}

impl<W: JournalWriter + ?Sized> JournalWriter for &mut W {
    fn write(&mut self, event: JournalEvent) {
        (**self).write(event);
    }
}

#[derive(Debug, Default)]
pub struct InMemoryJournal {
    events: Vec<JournalEvent>,
}

impl InMemoryJournal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[JournalEvent] {
        &self.events
    }
}

impl JournalWriter for InMemoryJournal {
    fn write(&mut self, event: JournalEvent) {
        self.events.push(event);
    }
}

/// Sink for callers that do not keep run history. Disconnects are an expected
/// termination and may be dropped without trace.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscardJournal;

impl JournalWriter for DiscardJournal {
    fn write(&mut self, _event: JournalEvent) {}
}

#[cfg(test)]
mod tests {
    use super::{DiscardJournal, InMemoryJournal, JournalEvent, JournalEventKind, JournalWriter};

    #[test]
    fn in_memory_journal_keeps_events_in_write_order() {
        let mut journal = InMemoryJournal::new();

        journal.write(JournalEvent::new(0, JournalEventKind::RunStarted, None));
        journal.write(JournalEvent::new(
            3,
            JournalEventKind::RunFailed,
            Some("source went away".to_string()),
        ));

        assert_eq!(journal.events().len(), 2);
        assert_eq!(journal.events()[0].kind, JournalEventKind::RunStarted);
        assert_eq!(journal.events()[1].index, 3);
        assert_eq!(
            journal.events()[1].detail.as_deref(),
            Some("source went away")
        );
    }

    #[test]
    fn discard_journal_accepts_events_without_keeping_them() {
        let mut journal = DiscardJournal;

        journal.write(JournalEvent::new(0, JournalEventKind::RunStarted, None));
    }
}
