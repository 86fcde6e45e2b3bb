// Copyright 2019-2022 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

mod message_accumulator;

pub use message_accumulator::MessageAccumulator;
