//! # goget - clone Go packages into GOPATH
//!
//! goget turns an import path such as `github.com/user/repo/subpkg` into a
//! git URL and clones it to `$GOPATH/src/<import path>`, skipping anything
//! that is already there. Given a `go.mod` it fetches every requirement in
//! parallel.
//!
//! ## Quick Start
//!
//! ```bash
//! goget github.com/user/repo/...
//! goget --https golang.org/x/crypto/ssh
//! goget --mod ./go.mod
//! ```
//!
//! ## Module Organization
//!
//! - [`request`] - Argument classification and validation
//! - [`resolve`] - Import path to clone URL (rules + `go-import` discovery)
//! - [`manifest`] - `go.mod` requirement scanning
//! - [`fetch`] - Clone pipeline and the parallel batch runner
//! - [`config`] - GOPATH handling, config file, runtime settings

/// Runtime settings and the optional config file.
pub mod config;

/// Clone pipeline, skip checks and batch mode.
pub mod fetch;

/// `go.mod` scanning.
pub mod manifest;

/// Import path parsing.
pub mod request;

/// Clone URL resolution.
pub mod resolve;

/// Serialized terminal output.
pub mod ui;
