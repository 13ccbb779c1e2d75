// This file is the module declaration file for the `core` module.
// In Rust, a `mod.rs` file within a directory (e.g., `src/core/`)
// serves two main purposes:
//
// 1. It declares the submodules contained within that directory.
// 2. It exposes these submodules to the parent module (`src/` in this case),
//    making them accessible to the entire crate.

// `config` module:
// This module is responsible for the process configuration. It defines the
// data structures for the configuration file (`Config`, `HostConfig`),
// the `ConfigProvider` trait with its file-backed `ConfigManager`, the
// environment overlay for tokens, and the `ConfigResolver` that loads the
// configuration once and caches the outcome.
pub mod config;

// `error` module:
// The typed errors of the crate. `ConfigError` and `GitError` describe the
// collaborators' failures; `Error` is what the factory accessors return.
pub mod error;

// `factory` module:
// The `Factory` aggregator and its builder. Each accessor is memoized
// independently and resolves its own dependencies on first use.
pub mod factory;

// `git` module:
// The `GitClient` trait and its `git2` implementation, used to list the
// remotes of the current repository and read the current branch.
pub mod git;

// `instance` module:
// The default host, the `GH_HOST` override and the hostname rules shared by
// authentication and remote classification.
pub mod instance;

// `memo` module:
// The single-assignment cache slot every accessor is built on.
pub mod memo;

// `remote` module:
// Remote URL classification, `ResolvedRepository`, and the stateless
// `RemoteResolver` that turns local remotes into repositories.
pub mod remote;
