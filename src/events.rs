//! Line-oriented CSV event interchange, used by replay harnesses.
//!
//! One event per line, integer fields:
//!
//! ```text
//! 0,id,type,side,price,quantity    new order
//! 1,id                             cancel
//! 2,id,side,price,quantity         modify
//! ```
//!
//! Type codes follow [`OrderType`] declaration order (GTC=0, FAK=1,
//! Market=2, GFD=3, FOK=4); side is Buy=0, Sell=1. The format round-trips
//! through [`std::fmt::Display`] and [`std::str::FromStr`].

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::book::Book;
use crate::order::{Order, OrderId, OrderModify, OrderType, Side};

/// One submission-stream event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrderEvent {
    New(Order),
    Cancel(OrderId),
    Modify(OrderModify),
}

impl fmt::Display for OrderEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderEvent::New(order) => write!(
                f,
                "0,{},{},{},{},{}",
                order.id(),
                order.order_type() as u8,
                order.side() as u8,
                order.price(),
                order.remaining_quantity()
            ),
            OrderEvent::Cancel(order_id) => write!(f, "1,{order_id}"),
            OrderEvent::Modify(request) => write!(
                f,
                "2,{},{},{},{}",
                request.id(),
                request.side() as u8,
                request.price(),
                request.quantity()
            ),
        }
    }
}

/// Failure decoding a CSV event line.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseEventError {
    #[error("empty event line")]
    Empty,
    #[error("unknown event tag `{0}`")]
    UnknownTag(String),
    #[error("expected {expected} fields after tag {tag}, got {got}")]
    FieldCount { tag: u8, expected: usize, got: usize },
    #[error("invalid integer field `{0}`")]
    InvalidField(String),
    #[error("unknown order type code {0}")]
    UnknownOrderType(u8),
    #[error("unknown side code {0}")]
    UnknownSide(u8),
}

fn parse_int<T: FromStr>(field: &str) -> Result<T, ParseEventError> {
    field
        .parse()
        .map_err(|_| ParseEventError::InvalidField(field.to_string()))
}

impl FromStr for OrderEvent {
    type Err = ParseEventError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut fields = line.trim().split(',');
        let tag = fields.next().filter(|t| !t.is_empty()).ok_or(ParseEventError::Empty)?;
        let rest: Vec<&str> = fields.collect();

        match tag {
            "0" => {
                if rest.len() != 5 {
                    return Err(ParseEventError::FieldCount {
                        tag: 0,
                        expected: 5,
                        got: rest.len(),
                    });
                }
                let id = parse_int(rest[0])?;
                let type_code: u8 = parse_int(rest[1])?;
                let side_code: u8 = parse_int(rest[2])?;
                let price = parse_int(rest[3])?;
                let quantity = parse_int(rest[4])?;
                let order_type = OrderType::from_code(type_code)
                    .ok_or(ParseEventError::UnknownOrderType(type_code))?;
                let side =
                    Side::from_code(side_code).ok_or(ParseEventError::UnknownSide(side_code))?;
                Ok(OrderEvent::New(Order::new(
                    id, order_type, side, price, quantity,
                )))
            }
            "1" => {
                if rest.len() != 1 {
                    return Err(ParseEventError::FieldCount {
                        tag: 1,
                        expected: 1,
                        got: rest.len(),
                    });
                }
                Ok(OrderEvent::Cancel(parse_int(rest[0])?))
            }
            "2" => {
                if rest.len() != 4 {
                    return Err(ParseEventError::FieldCount {
                        tag: 2,
                        expected: 4,
                        got: rest.len(),
                    });
                }
                let id = parse_int(rest[0])?;
                let side_code: u8 = parse_int(rest[1])?;
                let price = parse_int(rest[2])?;
                let quantity = parse_int(rest[3])?;
                let side =
                    Side::from_code(side_code).ok_or(ParseEventError::UnknownSide(side_code))?;
                Ok(OrderEvent::Modify(OrderModify::new(
                    id, side, price, quantity,
                )))
            }
            other => Err(ParseEventError::UnknownTag(other.to_string())),
        }
    }
}

/// Serialize events to the line format, one per line.
pub fn write_stream(events: &[OrderEvent]) -> String {
    let mut out = String::new();
    for event in events {
        out.push_str(&event.to_string());
        out.push('\n');
    }
    out
}

/// Parse a whole stream; blank lines are skipped.
pub fn parse_stream(input: &str) -> Result<Vec<OrderEvent>, ParseEventError> {
    input
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(OrderEvent::from_str)
        .collect()
}

/// Apply one event to a book.
pub fn apply(book: &mut Book, event: &OrderEvent) {
    match event {
        OrderEvent::New(order) => book.add(*order),
        OrderEvent::Cancel(order_id) => book.cancel(*order_id),
        OrderEvent::Modify(request) => book.modify(*request),
    }
}

/// Replay an event stream into a fresh book.
pub fn replay(events: &[OrderEvent]) -> Book {
    let mut book = Book::new();
    for event in events {
        apply(&mut book, event);
    }
    book
}
