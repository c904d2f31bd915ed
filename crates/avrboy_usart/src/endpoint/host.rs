//! Binding host files and standard input to the right [`InputEndpoint`].
//!
//! Unsupported stream kinds are rejected here, when the stream is bound,
//! so that polling never has to deal with them.
//!
//! Nothing here reads a host console's key events. On unix a terminal is a
//! character device and goes through `poll(2)` like a pipe. Elsewhere a
//! console stdin fails with [`UsartError::UnsupportedPlatform`]; a frontend
//! that owns the console must translate its key events into
//! [`ConsoleEvent`](super::ConsoleEvent)s and bind a
//! [`ConsoleInput`](super::ConsoleInput) with [`Usart::set_input`](crate::Usart::set_input).

use std::fs::File;
use std::path::Path;

use super::{InputEndpoint, SeekableInput};
use crate::UsartError;

/// Pick the readiness strategy for an already opened file.
///
/// - regular file: position against length ([`SeekableInput`])
/// - FIFO, socket, character device: `poll(2)` ([`super::FdInput`])
/// - anything else: [`UsartError::UnsupportedInput`]
#[cfg(unix)]
pub fn classify(file: File) -> Result<Box<dyn InputEndpoint>, UsartError> {
    use std::os::unix::fs::FileTypeExt;

    use super::FdInput;

    let file_type = file.metadata()?.file_type();
    if file_type.is_file() {
        log::debug!("usart input: regular file");
        Ok(Box::new(SeekableInput::new(file)))
    } else if file_type.is_fifo() || file_type.is_socket() || file_type.is_char_device() {
        log::debug!("usart input: pollable descriptor");
        Ok(Box::new(FdInput::new(file)))
    } else {
        let kind = if file_type.is_dir() {
            "directory"
        } else if file_type.is_block_device() {
            "block device"
        } else {
            "unknown file type"
        };
        Err(UsartError::UnsupportedInput { kind })
    }
}

/// Pick the readiness strategy for an already opened file.
///
/// Without `poll(2)` only regular files can be probed without blocking.
/// Pipes and consoles are rejected; see the module docs for console input.
#[cfg(not(unix))]
pub fn classify(file: File) -> Result<Box<dyn InputEndpoint>, UsartError> {
    if file.metadata()?.file_type().is_file() {
        Ok(Box::new(SeekableInput::new(file)))
    } else {
        Err(UsartError::UnsupportedPlatform)
    }
}

/// Open `path` for reading and classify it.
pub fn open(path: impl AsRef<Path>) -> Result<Box<dyn InputEndpoint>, UsartError> {
    classify(File::open(path)?)
}

/// Classify the process's standard input.
///
/// The descriptor is duplicated, so the returned endpoint does not go
/// through (or fight with) the buffered `std::io::Stdin` reader.
pub fn stdin() -> Result<Box<dyn InputEndpoint>, UsartError> {
    classify(stdin_file()?)
}

#[cfg(unix)]
fn stdin_file() -> Result<File, UsartError> {
    use std::os::fd::AsFd;

    Ok(File::from(std::io::stdin().as_fd().try_clone_to_owned()?))
}

#[cfg(windows)]
fn stdin_file() -> Result<File, UsartError> {
    use std::os::windows::io::AsHandle;

    Ok(File::from(std::io::stdin().as_handle().try_clone_to_owned()?))
}

#[cfg(not(any(unix, windows)))]
fn stdin_file() -> Result<File, UsartError> {
    Err(UsartError::UnsupportedPlatform)
}
