// This file is the module declaration file for the `builders` module.
// It declares and makes public all the sub-modules within the `src/builders`
// directory. These modules construct the handles commands use to reach
// outside the process.

// `browser` module:
// Describes how URLs are opened: the launcher named by `BROWSER`, or the
// platform opener when it is unset.
pub mod browser;

// `http` module:
// The `ClientFactory` and the `HttpClient` it builds. Requests carry the
// identifying User-Agent and the token configured for their target host.
pub mod http;

// `io` module:
// Terminal capabilities of the standard streams (TTY detection, color).
pub mod io;
