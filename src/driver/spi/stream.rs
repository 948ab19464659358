use alloc::vec::Vec;
use log::*;

use crate::board::SPIActions;
use crate::config::MAX_FIELD_BITS;
use crate::utils::{Error, Result};

/// One argument of a `send`/`send_recv` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamItem<'a> {
    Scalar(u32),
    Sequence(&'a [u32]),
    Text(&'a [u8]),
}

/// Data received for one item, in the same shape as the item that was sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Received {
    Scalar(u32),
    Sequence(Vec<u32>),
    Text(Vec<u8>),
}

impl<'a> StreamItem<'a> {
    pub fn len(&self) -> usize {
        match self {
            StreamItem::Scalar(_) => 1,
            StreamItem::Sequence(s) => s.len(),
            StreamItem::Text(t) => t.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<'a> From<u32> for StreamItem<'a> {
    fn from(v: u32) -> Self {
        StreamItem::Scalar(v)
    }
}

impl<'a> From<&'a [u32]> for StreamItem<'a> {
    fn from(v: &'a [u32]) -> Self {
        StreamItem::Sequence(v)
    }
}

impl<'a> From<&'a [u8]> for StreamItem<'a> {
    fn from(v: &'a [u8]) -> Self {
        StreamItem::Text(v)
    }
}

impl<'a> From<&'a str> for StreamItem<'a> {
    fn from(v: &'a str) -> Self {
        StreamItem::Text(v.as_bytes())
    }
}

/// Outcome of a streaming call: units written and, when receiving, one entry
/// per non-empty item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamResult {
    pub written: usize,
    pub received: Vec<Received>,
}

/// Moves units through the bus, one at a time, in either direction.
struct Streamer<'b, T: SPIActions> {
    bus: &'b mut T,
    id: usize,
    databits: u8,
    want_receive: bool,
}

impl<'b, T: SPIActions> Streamer<'b, T> {
    fn unit(&mut self, data: u32) -> Option<u32> {
        trace!("spi{} <- {:#x}", self.id, data);
        if self.want_receive {
            Some(self.bus.send_recv(self.id, self.databits, data))
        } else {
            self.bus.send(self.id, self.databits, data);
            None
        }
    }

    /// Streams every unit of `item`; returns the units consumed and the echo.
    fn item(&mut self, item: &StreamItem) -> (usize, Option<Received>) {
        match *item {
            StreamItem::Scalar(v) => (1, self.unit(v).map(Received::Scalar)),
            StreamItem::Sequence(values) => {
                let mut echo = Vec::with_capacity(if self.want_receive { values.len() } else { 0 });
                let mut consumed = 0;
                for &v in values {
                    if let Some(r) = self.unit(v) {
                        echo.push(r);
                    }
                    consumed += 1;
                }
                let received = (self.want_receive && !values.is_empty()).then(|| Received::Sequence(echo));
                (consumed, received)
            }
            StreamItem::Text(bytes) => {
                let mut echo = Vec::with_capacity(if self.want_receive { bytes.len() } else { 0 });
                let mut consumed = 0;
                for &b in bytes {
                    if let Some(r) = self.unit(b as u32) {
                        echo.push(r as u8);
                    }
                    consumed += 1;
                }
                let received = (self.want_receive && !bytes.is_empty()).then(|| Received::Text(echo));
                (consumed, received)
            }
        }
    }
}

fn check_databits(databits: u8) -> Result<()> {
    if databits == 0 || databits as usize > MAX_FIELD_BITS {
        return Err(Error::InvalidArgument("databits"));
    }
    Ok(())
}

/// Streams `items` left to right with `databits`-wide units.
pub fn stream<T: SPIActions>(
    bus: &mut T,
    id: usize,
    databits: u8,
    items: &[StreamItem],
    want_receive: bool,
) -> Result<StreamResult> {
    if items.is_empty() {
        return Err(Error::Arity("data"));
    }
    check_databits(databits)?;

    let mut streamer = Streamer { bus, id, databits, want_receive };
    let mut result = StreamResult::default();
    for item in items {
        let (consumed, received) = streamer.item(item);
        result.written += consumed;
        if let Some(r) = received {
            result.received.push(r);
        }
        if consumed < item.len() {
            warn!("spi{}: item cut short after {} of {} units", id, consumed, item.len());
            break;
        }
    }
    debug!("spi{} streamed {} units", id, result.written);
    Ok(result)
}

/// Clocks `default` out `size` times and returns the echoed bytes.
pub fn recv<T: SPIActions>(bus: &mut T, id: usize, databits: u8, size: usize, default: u32) -> Result<Option<Vec<u8>>> {
    if size == 0 {
        return Ok(None);
    }
    check_databits(databits)?;
    Ok(Some(
        (0..size).map(|_| bus.send_recv(id, databits, default) as u8).collect(),
    ))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::board::loopback::Loopback;
    use crate::config::DEFAULT_RECV_WORD;

    #[test]
    fn scalar_echoes_one_unit() {
        let mut bus = Loopback::new();
        let r = stream(&mut bus, 0, 8, &[StreamItem::Scalar(5)], true).unwrap();
        assert_eq!(r.written, 1);
        assert_eq!(r.received, vec![Received::Scalar(5)]);
    }

    #[test]
    fn empty_items_have_no_result_slot() {
        let mut bus = Loopback::new();
        let r = stream(&mut bus, 0, 8, &[StreamItem::Sequence(&[])], true).unwrap();
        assert_eq!(r, StreamResult { written: 0, received: vec![] });

        let r = stream(&mut bus, 0, 8, &["".into(), 7u32.into(), StreamItem::Text(b"")], true).unwrap();
        assert_eq!(r.written, 1);
        assert_eq!(r.received, vec![Received::Scalar(7)]);
    }

    #[test]
    fn shapes_are_mirrored_in_order() {
        let mut bus = Loopback::new();
        let seq: [u32; 3] = [0x10, 0x1ff, 0x30];
        let items = [StreamItem::Text(b"AB"), StreamItem::Sequence(&seq), StreamItem::Scalar(0x42)];
        let r = stream(&mut bus, 1, 8, &items, true).unwrap();
        assert_eq!(r.written, 6);
        assert_eq!(
            r.received,
            vec![
                Received::Text(b"AB".to_vec()),
                Received::Sequence(vec![0x10, 0xff, 0x30]),
                Received::Scalar(0x42),
            ]
        );
        assert_eq!(bus.sent(1), &[0x41, 0x42, 0x10, 0x1ff, 0x30, 0x42]);
    }

    #[test]
    fn send_only_counts_units() {
        let mut bus = Loopback::new();
        let r = stream(&mut bus, 0, 16, &["hello".into(), StreamItem::Sequence(&[1, 2])], false).unwrap();
        assert_eq!(r.written, 7);
        assert!(r.received.is_empty());
        assert_eq!(bus.sent(0).len(), 7);
        assert_eq!(bus.exchanges(), 0);
    }

    #[test]
    fn text_keeps_the_low_byte_of_each_echo() {
        let mut bus = Loopback::new();
        bus.set_echo_xor(0x1_00);
        let r = stream(&mut bus, 0, 32, &["\u{7f}".into()], true).unwrap();
        assert_eq!(r.received, vec![Received::Text(vec![0x7f])]);
    }

    #[test]
    fn unusable_width_or_missing_items_fail_before_streaming() {
        let mut bus = Loopback::new();
        assert_eq!(stream(&mut bus, 0, 0, &[1u32.into()], true), Err(Error::InvalidArgument("databits")));
        assert_eq!(stream(&mut bus, 0, 8, &[], false), Err(Error::Arity("data")));
        assert!(bus.sent(0).is_empty());
    }

    #[test]
    fn recv_clocks_out_the_default_word() {
        let mut bus = Loopback::new();
        assert_eq!(recv(&mut bus, 0, 8, 0, DEFAULT_RECV_WORD), Ok(None));
        assert!(bus.sent(0).is_empty());
        assert_eq!(recv(&mut bus, 0, 8, 3, DEFAULT_RECV_WORD), Ok(Some(vec![0xff; 3])));
        assert_eq!(bus.sent(0), &[DEFAULT_RECV_WORD; 3]);
        assert_eq!(recv(&mut bus, 0, 8, 2, 0x5a), Ok(Some(vec![0x5a, 0x5a])));
    }
}
