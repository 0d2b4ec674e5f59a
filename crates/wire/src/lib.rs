//! BINN-framed binary codec for the gdaemon wire protocol (§4.A, §6).
//!
//! Every message on the wire is a BINN container — our own typed,
//! tag-prefixed container format modeled on the public BINN container
//! design (signed/unsigned integers of 1/2/4/8 bytes, booleans, UTF-8
//! strings, floats, blobs, and typed lists/maps whose elements carry their
//! own type tag) — followed by the fixed 4-byte end marker `FF FF FF FF`.
//! All integers are little-endian.
//!
//! This crate is split into:
//! - [`value`]: the untyped [`Value`] sum type and its byte encoding.
//! - [`frame`]: reading/writing one full frame (container + end marker)
//!   from/to an async byte stream.
//! - [`message`]: typed message constructors/accessors built on [`Value`]
//!   (login, status, command, file operations, base responses) plus the
//!   wire constants from §4.A's selector tables.

mod error;
mod frame;
mod message;
mod value;

pub use error::WireError;
pub use frame::{read_frame, write_frame, END_MARKER};
pub use message::{
    BaseResponse, CommandExecRequest, FileOpSelector, FileSendDirection, FileType, LoginRequest,
    Mode, StatusCode, StatusRequestKind,
};
pub use value::Value;
