// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Domain types shared across the extraction pipeline.

pub mod amount;
pub mod swap;

// Note: Public types are re-exported from lib.rs, not here
