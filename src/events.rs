use futures::channel::mpsc::{UnboundedReceiver, UnboundedSender, unbounded};

/// Progress of a crawl, in the order things happen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlEvent {
    TabsDiscovered {
        labels: Vec<String>,
        start: usize,
    },
    TabStarted {
        index: usize,
        label: String,
    },
    TabSkipped {
        index: usize,
        label: String,
        reason: String,
    },
    PassCompleted {
        index: usize,
        pass: usize,
        candidates: usize,
        stagnant: usize,
    },
    TabFinished {
        index: usize,
        label: String,
        items: usize,
    },
    RunFinished {
        total: usize,
    },
}

/// Where the crawler reports progress. The receiving half is a
/// `futures::Stream` that ends once the sink is dropped.
#[derive(Debug, Default)]
pub struct EventSink {
    sender: Option<UnboundedSender<CrawlEvent>>,
}

impl EventSink {
    pub fn channel() -> (Self, UnboundedReceiver<CrawlEvent>) {
        let (sender, receiver) = unbounded();
        (
            Self {
                sender: Some(sender),
            },
            receiver,
        )
    }

    /// A sink nobody listens to.
    pub fn discard() -> Self {
        Self::default()
    }

    pub fn emit(&self, event: CrawlEvent) {
        if let Some(sender) = &self.sender {
            // A dropped receiver just means nobody is watching anymore.
            let _ = sender.unbounded_send(event);
        }
    }
}
