//! In-memory transport for unit tests.
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use feed_common::codec;
use feed_common::{FeedError, Result};

use crate::transport::Transport;

#[derive(Default)]
struct Shared {
    sent: Vec<String>,
    closes: usize,
}

/// Plays back scripted buffers and records what the client writes.
pub(crate) struct ScriptedTransport {
    inbound: VecDeque<String>,
    repeat: Option<String>,
    shared: Rc<RefCell<Shared>>,
}

/// Read side of a [`ScriptedTransport`] kept by the test.
pub(crate) struct Probe(Rc<RefCell<Shared>>);

impl ScriptedTransport {
    pub(crate) fn new(inbound: Vec<String>) -> (Self, Probe) {
        let shared = Rc::new(RefCell::new(Shared::default()));
        let transport = Self {
            inbound: inbound.into(),
            repeat: None,
            shared: Rc::clone(&shared),
        };
        (transport, Probe(shared))
    }

    /// After the scripted buffers run out, `repeat` is delivered forever.
    pub(crate) fn repeating(inbound: Vec<String>, repeat: String) -> (Self, Probe) {
        let (mut transport, probe) = Self::new(inbound);
        transport.repeat = Some(repeat);
        (transport, probe)
    }
}

impl Transport for ScriptedTransport {
    fn send_text(&mut self, text: String) -> Result<()> {
        self.shared.borrow_mut().sent.push(text);
        Ok(())
    }

    fn recv_text(&mut self) -> Result<String> {
        match self.inbound.pop_front() {
            Some(buf) => Ok(buf),
            None => self
                .repeat
                .clone()
                .ok_or_else(|| FeedError::Connection("script exhausted".to_string())),
        }
    }

    fn close(&mut self) -> Result<()> {
        self.shared.borrow_mut().closes += 1;
        Ok(())
    }
}

impl Probe {
    pub(crate) fn sent(&self) -> Vec<String> {
        self.0.borrow().sent.clone()
    }

    /// Method names of every frame written so far, in order.
    pub(crate) fn sent_methods(&self) -> Vec<String> {
        self.0
            .borrow()
            .sent
            .iter()
            .flat_map(|buf| codec::decode(buf))
            .filter_map(|frame| frame.method)
            .collect()
    }

    pub(crate) fn closes(&self) -> usize {
        self.0.borrow().closes
    }
}
