//! Connection states tracked by the client's type parameter.

/// A state an IMAP client can be in.
///
/// Sealed: only the markers in this module implement it.
pub trait State: private::Sealed {
    /// Name used in `Debug` output and logs.
    const NAME: &'static str;
}

mod private {
    pub trait Sealed {}
}

/// Greeted with `* OK`: STARTTLS, CAPABILITY and authentication are valid.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotAuthenticated;

/// Logged in, or greeted with `* PREAUTH`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Authenticated;

impl private::Sealed for NotAuthenticated {}
impl private::Sealed for Authenticated {}

impl State for NotAuthenticated {
    const NAME: &'static str = "not authenticated";
}

impl State for Authenticated {
    const NAME: &'static str = "authenticated";
}
