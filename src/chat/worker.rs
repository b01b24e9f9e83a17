use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};

use crate::error::ChatError;

use super::{ChatBackend, ChatMessage};

/// Request id handed back with its result.
pub type RequestId = u64;

#[derive(Debug)]
pub enum ChatEvent {
    Reply { id: RequestId, content: Option<String> },
    Failed { id: RequestId, error: ChatError },
}

struct Job {
    id: RequestId,
    messages: Vec<ChatMessage>,
}

/// Runs completions one at a time on a background thread. Poll it once a
/// frame.
pub struct ChatWorker {
    jobs: Option<Sender<Job>>,
    events: Receiver<ChatEvent>,
    thread: Option<JoinHandle<()>>,
    next_id: RequestId,
    in_flight: usize,
}

impl ChatWorker {
    pub fn spawn(backend: Box<dyn ChatBackend>) -> Self {
        let (job_tx, job_rx) = mpsc::channel::<Job>();
        let (event_tx, event_rx) = mpsc::channel();
        let thread = thread::Builder::new()
            .name("chat-worker".into())
            .spawn(move || {
                for job in job_rx {
                    let event = match backend.complete(&job.messages) {
                        Ok(content) => ChatEvent::Reply { id: job.id, content },
                        Err(error) => ChatEvent::Failed { id: job.id, error },
                    };
                    if event_tx.send(event).is_err() {
                        break;
                    }
                }
            });
        let thread = match thread {
            Ok(handle) => Some(handle),
            Err(e) => {
                log::error!("could not start chat worker: {e}");
                None
            }
        };
        Self { jobs: Some(job_tx), events: event_rx, thread, next_id: 0, in_flight: 0 }
    }

    /// Queue a completion for `messages`.
    pub fn submit(&mut self, messages: Vec<ChatMessage>) -> Result<RequestId, ChatError> {
        let id = self.next_id;
        self.next_id += 1;
        let sent = self.jobs.as_ref().map(|tx| tx.send(Job { id, messages }).is_ok()).unwrap_or(false);
        if !sent || self.thread.is_none() {
            return Err(ChatError::Transport("chat worker is not running".into()));
        }
        self.in_flight += 1;
        Ok(id)
    }

    /// Events that arrived since the last poll.
    pub fn poll(&mut self) -> Vec<ChatEvent> {
        let mut out = Vec::new();
        loop {
            match self.events.try_recv() {
                Ok(event) => {
                    self.in_flight = self.in_flight.saturating_sub(1);
                    out.push(event);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if self.in_flight > 0 {
                        log::warn!("chat worker exited with {} requests pending", self.in_flight);
                        self.in_flight = 0;
                    }
                    break;
                }
            }
        }
        out
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight > 0
    }
}

impl Drop for ChatWorker {
    fn drop(&mut self) {
        // Closing the queue ends the detached thread after its current request.
        self.jobs.take();
        self.thread.take();
    }
}
