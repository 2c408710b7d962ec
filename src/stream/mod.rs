//! Undelimited JSON stream handling

mod decoder;
mod reader;
mod source;

pub use decoder::{StreamDecoder, Values};
pub use reader::{JsonStream, StreamEvent};
pub use source::{ByteSource, Connection, ReaderSource, Recv};

#[cfg(test)]
pub(crate) use reader::tests as testing;
