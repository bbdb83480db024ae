// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! End-to-end workflow tests for the tick-core crate.
//!
//! These tests run the engine over a real file cache, talking either to a
//! wiremock backend through the HTTP client or to no backend at all.
