// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! A library for zkApp server metrics.

pub mod monitoring_server;
