//! Binary font I/O for `ligafont-engine`.
//!
//! [`decode`] reads an sfnt or WOFF file into a [`TableSet`], and [`encode`]
//! writes a table set back out in any [`ContainerFormat`]. Tables the engine
//! does not model travel through untouched.
//!
//! ```no_run
//! use ligafont_codec::{ContainerFormat, decode, encode};
//!
//! let data = std::fs::read("icons.ttf").unwrap();
//! let tables = decode(&data).unwrap();
//! let woff = encode(&tables, ContainerFormat::Woff).unwrap();
//! ```
//!
//! [`TableSet`]: ligafont_engine::TableSet

mod container;
mod decode;
mod encode;
mod error;
mod names;
mod tables;
mod woff;
mod woff2;

pub use container::ContainerFormat;
pub use decode::{decode, decode_sfnt};
pub use encode::{encode, encode_sfnt, wrap};
pub use error::{Error, Result};
