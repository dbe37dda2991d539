// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI command implementations

pub mod availability;
pub mod book;
pub mod calendar;
pub mod store;
