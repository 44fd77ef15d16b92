// Copyright 2020 the Druid Authors
// SPDX-License-Identifier: Apache-2.0

//! Platform backends.

pub mod x11;
