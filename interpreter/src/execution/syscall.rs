use num_enum::TryFromPrimitive;
use tracing::debug;

use super::{context::StepContext, Input, InputRequest, InterpreterError};
use crate::registers::Register;

/// The supported trap codes, read from `$v0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(i32)]
pub enum SyscallCode {
    PrintInt = 1,
    PrintString = 4,
    ReadInt = 5,
    ReadString = 8,
}

impl StepContext<'_> {
    pub(crate) fn syscall(&mut self) -> Result<(), InterpreterError> {
        let code = self.register(Register::V0);
        let code =
            SyscallCode::try_from(code).map_err(|_| InterpreterError::UnsupportedSyscall(code))?;

        match code {
            SyscallCode::PrintInt => {
                let value = self.register(Register::A0);
                self.emit_output(&value.to_string());
            }
            SyscallCode::PrintString => {
                let address = self.register(Register::A0);
                let text = self.read_cstring(address.into())?;
                self.emit_output(&text);
            }
            SyscallCode::ReadInt => {
                debug!("read-int: waiting for input");
                self.interrupt(InputRequest::Integer);
            }
            SyscallCode::ReadString => {
                let buffer = self.register(Register::A0);
                let length = self.register(Register::A1);
                // The whole declared buffer must be addressable before suspending.
                let buffer = if length > 0 {
                    self.check_writable(buffer.into(), length as usize)?
                } else {
                    buffer as u32
                };
                debug!(buffer, length, "read-string: waiting for input");
                self.interrupt(InputRequest::Text { buffer, length });
            }
        }
        Ok(())
    }

    /// Completes the pending input syscall with `input`.
    pub(crate) fn complete_input(
        &mut self,
        request: InputRequest,
        input: Input,
    ) -> Result<(), InterpreterError> {
        match (request, input) {
            (InputRequest::Integer, Input::Integer(value)) => {
                self.set_register(Register::V0, value);
            }
            (InputRequest::Text { buffer, length }, Input::Text(text)) => {
                let bytes = fgets_bytes(text.as_bytes(), length);
                self.write_bytes(buffer.into(), &bytes)?;
                self.set_register(Register::V0, buffer as i32);
            }
            (request, input) => {
                return Err(InterpreterError::InvalidInput(format!(
                    "expected {request}, got {input:?}"
                )))
            }
        }
        self.resume();
        Ok(())
    }
}

/// The bytes `fgets` would store for `input` in a buffer of `length` bytes:
/// at most `length - 1` data bytes, a newline if room remains, then a null
/// terminator. Nothing is stored when `length < 1`.
pub(crate) fn fgets_bytes(input: &[u8], length: i32) -> Vec<u8> {
    let Ok(length) = usize::try_from(length) else {
        return Vec::new();
    };
    if length == 0 {
        return Vec::new();
    }

    let capacity = length - 1;
    let data = &input[..input.len().min(capacity)];
    let mut bytes = Vec::with_capacity(length);
    bytes.extend_from_slice(data);
    if bytes.len() < capacity {
        bytes.push(b'\n');
    }
    bytes.push(0);
    bytes
}
