/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */
//#![warn(missing_docs, rust_2018_idioms)]
pub mod crypto;
pub mod crypto_impl;

mod aad;
mod antireplay;
mod context;
mod envelope;
mod log_event;
mod message;
mod option_codec;
mod partition;
mod protect;
mod sequence;
mod store;
mod unprotect;

pub mod application;
pub mod presets;
pub mod proto;
pub mod resource;
pub mod result;

pub use crate::aad::{enc_structure, external_aad};
pub use crate::antireplay::Window;
pub use crate::context::*;
pub use crate::envelope::*;
pub use crate::log_event::*;
pub use crate::message::*;
pub use crate::option_codec::{decode_options, encode_options, CodecError};
pub use crate::partition::{option_class, OptionClass};
pub use crate::sequence::*;
pub use crate::store::*;
