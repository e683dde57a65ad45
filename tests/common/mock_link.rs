//! Scripted mock link for driving devices without hardware

use register_layout::DataLink;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Records operations performed on the mock link
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Bytes sent to the device
    Write(Vec<u8>),
    /// Bytes handed back for a plain read
    Read(Vec<u8>),
    /// Command sent, then response handed back
    WriteRead {
        /// Bytes sent before the read
        command: Vec<u8>,
        /// Bytes handed back
        response: Vec<u8>,
    },
}

/// Error returned by the mock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockError {
    /// Injected with `fail_next`
    Injected,
    /// The driver sent something the script did not expect
    Unexpected,
}

#[derive(Debug, Default)]
struct MockState {
    /// Responses queued for reads, in order
    responses: VecDeque<Vec<u8>>,

    /// Operations log for verification
    operations: Vec<Operation>,

    /// Failure injection flag
    fail_next: bool,
}

/// Mock link; clones share state so the test keeps a handle after giving one to a driver
#[derive(Debug, Clone, Default)]
pub struct MockLink {
    state: Rc<RefCell<MockState>>,
}

impl MockLink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue bytes for the next read or write-read
    pub fn respond_with(&self, bytes: &[u8]) {
        self.state.borrow_mut().responses.push_back(bytes.to_vec());
    }

    /// Make the next operation fail
    pub fn fail_next(&self) {
        self.state.borrow_mut().fail_next = true;
    }

    pub fn operations(&self) -> Vec<Operation> {
        self.state.borrow().operations.clone()
    }

    /// All bytes written, one entry per message, including write-read commands
    pub fn written(&self) -> Vec<Vec<u8>> {
        self.operations()
            .into_iter()
            .filter_map(|op| match op {
                Operation::Write(bytes) => Some(bytes),
                Operation::WriteRead { command, .. } => Some(command),
                Operation::Read(_) => None,
            })
            .collect()
    }

    pub fn pending_responses(&self) -> usize {
        self.state.borrow().responses.len()
    }

    fn take_failure(&self) -> Result<(), MockError> {
        let mut state = self.state.borrow_mut();
        if state.fail_next {
            state.fail_next = false;
            Err(MockError::Injected)
        } else {
            Ok(())
        }
    }

    fn next_response(&self, buffer: &mut [u8]) -> Result<Vec<u8>, MockError> {
        let response = self
            .state
            .borrow_mut()
            .responses
            .pop_front()
            .ok_or(MockError::Unexpected)?;
        if response.len() != buffer.len() {
            return Err(MockError::Unexpected);
        }
        buffer.copy_from_slice(&response);
        Ok(response)
    }
}

impl DataLink for MockLink {
    type Error = MockError;

    fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        self.take_failure()?;
        self.state
            .borrow_mut()
            .operations
            .push(Operation::Write(bytes.to_vec()));
        Ok(())
    }

    fn read(&mut self, buffer: &mut [u8]) -> Result<(), Self::Error> {
        self.take_failure()?;
        let response = self.next_response(buffer)?;
        self.state
            .borrow_mut()
            .operations
            .push(Operation::Read(response));
        Ok(())
    }

    fn write_read(&mut self, command: &[u8], buffer: &mut [u8]) -> Result<(), Self::Error> {
        self.take_failure()?;
        let response = self.next_response(buffer)?;
        self.state.borrow_mut().operations.push(Operation::WriteRead {
            command: command.to_vec(),
            response,
        });
        Ok(())
    }
}
