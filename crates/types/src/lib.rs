// This file is part of AAKit.
//
// AAKit is free software: you can redistribute it and/or modify it under the
// terms of the GNU Lesser General Public License as published by the Free Software
// Foundation, either version 3 of the License, or (at your option) any later version.
//
// AAKit is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with AAKit.
// If not, see https://www.gnu.org/licenses/.

#![warn(missing_docs, unreachable_pub)]
#![deny(unused_must_use, rust_2018_idioms)]
#![doc(test(
    no_crate_inject,
    attr(deny(warnings, rust_2018_idioms), allow(dead_code, unused_variables))
))]

//! AAKit types

mod call;
pub use call::{Call, ParseCallError};

mod contract;
pub use contract::ContractKind;

mod event;
pub use event::ContractEvent;

mod user_operation;
pub use user_operation::{
    UserOperation, UserOperationBuilder, UserOperationError, UserOperationId,
    UserOperationRequiredFields,
};

mod validation;
pub use validation::{parse_validation_data, ValidationData, SIG_VALIDATION_FAILED};
