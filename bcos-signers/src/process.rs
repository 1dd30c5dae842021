//! Signing through an external program.
//!
//! The program is spawned once per signature. It receives two lines on stdin:
//!
//! ```text
//! <suite name>          e.g. `standard` or `sm`
//! <hex payload>         the unsigned transaction encoding, or a call payload
//! ```
//!
//! and must print the 65 byte `r || s || v` signature as hex (optionally `0x` prefixed) on
//! stdout, then exit with status 0. The program is responsible for hashing the payload with the
//! suite's hash function.
use crate::{Signer, SignerError};
use bcos_core::types::{Address, CryptoSuite, Signature, SignatureError};
use std::{
    ffi::OsString,
    io::Write,
    path::PathBuf,
    process::{Command, Stdio},
};
use thiserror::Error;
use tracing::{debug, trace};

/// Errors from running the signing program
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("failed to run signing program: {0}")]
    Io(#[from] std::io::Error),
    #[error("signing program exited with {status}: {stderr}")]
    Exit { status: std::process::ExitStatus, stderr: String },
    #[error("signing program printed an invalid signature: {0}")]
    InvalidSignature(#[source] SignatureError),
}

/// A [`Signer`] that delegates to an external program, e.g. a wrapper around an HSM or the
/// node operator's native signing service.
#[derive(Clone, Debug)]
pub struct ProcessSigner {
    program: PathBuf,
    args: Vec<OsString>,
    address: Address,
    suites: Vec<CryptoSuite>,
}

impl ProcessSigner {
    /// Creates a signer running `program` for an account with the given address.
    ///
    /// Both suites are assumed to be supported, see [`ProcessSigner::suites`].
    pub fn new<P: Into<PathBuf>>(program: P, address: Address) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            address,
            suites: vec![CryptoSuite::Standard, CryptoSuite::Sm],
        }
    }

    /// Appends an argument passed to the program on every invocation
    pub fn arg<S: Into<OsString>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends multiple arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Restricts the suites the program is asked to sign for
    pub fn suites<I: IntoIterator<Item = CryptoSuite>>(mut self, suites: I) -> Self {
        self.suites = suites.into_iter().collect();
        self
    }

    fn run(&self, payload: &[u8], suite: CryptoSuite) -> Result<Signature, ProcessError> {
        trace!(program = ?self.program, %suite, len = payload.len(), "spawning signing program");
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            writeln!(stdin, "{suite}")?;
            writeln!(stdin, "{}", hex::encode(payload))?;
        }

        let output = child.wait_with_output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            debug!(status = %output.status, %stderr, "signing program failed");
            return Err(ProcessError::Exit { status: output.status, stderr })
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        stdout.trim().parse::<Signature>().map_err(ProcessError::InvalidSignature)
    }
}

impl Signer for ProcessSigner {
    fn sign_payload(&self, payload: &[u8], suite: CryptoSuite) -> Result<Signature, SignerError> {
        if !self.supports_suite(suite) {
            return Err(SignerError::UnsupportedSuite(suite))
        }
        Ok(self.run(payload, suite)?)
    }

    fn address(&self) -> Address {
        self.address
    }

    fn supports_suite(&self, suite: CryptoSuite) -> bool {
        self.suites.contains(&suite)
    }
}
