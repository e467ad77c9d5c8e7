//! One-slot rendezvous mailboxes between the two engines
//!
//! Each direction is a `sync_channel(1)`: a send blocks while the previous
//! message is still unread and a receive blocks until one arrives. Messages
//! travel as their fixed-width word records and are decoded and checked for
//! the right recipient on arrival.

use std::marker::PhantomData;
use std::sync::mpsc::{Receiver, SyncSender, sync_channel};

use crate::error::ProtocolError;
use crate::protocol::{BallReport, Recipient, SessionReply, WireMessage};

/// One engine's end of the link: sends `Out`, receives `In`
pub struct Endpoint<Out: WireMessage, In: WireMessage> {
    owner: Recipient,
    tx: SyncSender<Out::Words>,
    rx: Receiver<In::Words>,
    _messages: PhantomData<fn(Out) -> In>,
}

/// Motion engine side: sends reports, receives replies
pub type MotionLink = Endpoint<BallReport, SessionReply>;
/// Session engine side: sends replies, receives reports
pub type SessionLink = Endpoint<SessionReply, BallReport>;

/// Create a connected pair of endpoints
pub fn link() -> (MotionLink, SessionLink) {
    let (report_tx, report_rx) = sync_channel(1);
    let (reply_tx, reply_rx) = sync_channel(1);
    (
        Endpoint {
            owner: Recipient::Motion,
            tx: report_tx,
            rx: reply_rx,
            _messages: PhantomData,
        },
        Endpoint {
            owner: Recipient::Session,
            tx: reply_tx,
            rx: report_rx,
            _messages: PhantomData,
        },
    )
}

impl<Out: WireMessage, In: WireMessage> Endpoint<Out, In> {
    /// Engine this endpoint belongs to
    pub fn owner(&self) -> Recipient {
        self.owner
    }

    /// Block until the slot is free, then send
    pub fn send(&self, message: &Out) -> Result<(), ProtocolError> {
        self.tx
            .send(message.to_words())
            .map_err(|_| ProtocolError::Disconnected)
    }

    /// Block until a message arrives. Rejects anything not addressed to us.
    pub fn recv(&self) -> Result<In, ProtocolError> {
        let words = self.rx.recv().map_err(|_| ProtocolError::Disconnected)?;
        let message = In::from_words(&words)?;
        if message.recipient() != self.owner {
            return Err(ProtocolError::Misaddressed {
                receiver: self.owner,
                addressed: message.recipient(),
            });
        }
        Ok(message)
    }
}
