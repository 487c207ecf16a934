// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Errors from the inbound transfer feed.
//!
//! Any of these aborts the current ingestion run: the feed is offset-paginated,
//! so a failed page leaves nothing to resume from.

/// Errors that can occur while paging the transfer feed.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// The HTTP request could not be sent or the body could not be read.
    #[error("Feed request failed at offset {offset}")]
    Transport {
        /// Pagination offset of the failed page
        offset: usize,
        /// The underlying HTTP client error
        #[source]
        source: reqwest::Error,
    },

    /// The feed answered with a non-success status.
    #[error("Feed returned HTTP {status} at offset {offset}")]
    Status {
        /// Pagination offset of the failed page
        offset: usize,
        /// HTTP status code
        status: u16,
    },

    /// The feed answered with a body that is not a transfer page.
    #[error("Feed page at offset {offset} could not be decoded: {details}")]
    Decode {
        /// Pagination offset of the failed page
        offset: usize,
        /// Decoder message
        details: String,
    },
}

impl FeedError {
    /// Helper to create a `Transport` error.
    pub fn transport(offset: usize, source: reqwest::Error) -> Self {
        FeedError::Transport { offset, source }
    }
}
