//! This module provides ways to tweak mocked to-do sources, so that they can return errors on some tests
#![cfg(test)]

use std::error::Error;

/// This stores some behaviour tweaks, that describe how a mocked instance will behave during a given test
///
/// So that a functions fails _n_ times after _m_ initial successes, set `(m, n)` for the suited parameter
#[derive(Default, Clone, Debug)]
pub struct MockBehaviour {
    pub list_todos_behaviour: (u32, u32),
    pub add_todo_behaviour: (u32, u32),
    pub set_completed_behaviour: (u32, u32),
    pub delete_todo_behaviour: (u32, u32),
}

impl MockBehaviour {
    pub fn new() -> Self {
        Self::default()
    }

    /// All items will fail at once, for `n_fails` times
    pub fn fail_now(n_fails: u32) -> Self {
        Self {
            list_todos_behaviour: (0, n_fails),
            add_todo_behaviour: (0, n_fails),
            set_completed_behaviour: (0, n_fails),
            delete_todo_behaviour: (0, n_fails),
        }
    }

    pub fn can_list_todos(&mut self) -> Result<(), Box<dyn Error>> {
        decrement(&mut self.list_todos_behaviour, "list_todos")
    }
    pub fn can_add_todo(&mut self) -> Result<(), Box<dyn Error>> {
        decrement(&mut self.add_todo_behaviour, "add_todo")
    }
    pub fn can_set_completed(&mut self) -> Result<(), Box<dyn Error>> {
        decrement(&mut self.set_completed_behaviour, "set_completed")
    }
    pub fn can_delete_todo(&mut self) -> Result<(), Box<dyn Error>> {
        decrement(&mut self.delete_todo_behaviour, "delete_todo")
    }
}


/// Return Ok(()) in case the value is `(1+, _)` or `(_, 0)`, or return Err and decrement otherwise
fn decrement(value: &mut (u32, u32), descr: &str) -> Result<(), Box<dyn Error>> {
    let remaining_successes = value.0;
    let remaining_failures = value.1;

    if remaining_successes > 0 {
        value.0 = value.0 - 1;
        log::debug!("Mock behaviour: allowing a {} ({:?})", descr, value);
        Ok(())
    } else {
        if remaining_failures > 0 {
            value.1 = value.1 - 1;
            log::debug!("Mock behaviour: failing a {} ({:?})", descr, value);
            Err(format!("Mocked behaviour requires this {} to fail this time. ({:?})", descr, value).into())
        } else {
            log::debug!("Mock behaviour: allowing a {} ({:?})", descr, value);
            Ok(())
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_mock_behaviour() {
        let mut ok = MockBehaviour::new();
        for _ in 0..5 {
            assert!(ok.can_list_todos().is_ok());
            assert!(ok.can_delete_todo().is_ok());
        }

        let mut now = MockBehaviour::fail_now(2);
        assert!(now.can_list_todos().is_err());
        assert!(now.can_add_todo().is_err());
        assert!(now.can_add_todo().is_err());
        assert!(now.can_list_todos().is_err());
        assert!(now.can_list_todos().is_ok());
        assert!(now.can_list_todos().is_ok());
        assert!(now.can_add_todo().is_ok());

        let mut custom = MockBehaviour{
            list_todos_behaviour: (0,1),
            set_completed_behaviour: (1,3),
            ..MockBehaviour::default()
        };
        assert!(custom.can_list_todos().is_err());
        assert!(custom.can_list_todos().is_ok());
        assert!(custom.can_list_todos().is_ok());
        assert!(custom.can_set_completed().is_ok());
        assert!(custom.can_set_completed().is_err());
        assert!(custom.can_set_completed().is_err());
        assert!(custom.can_set_completed().is_err());
        assert!(custom.can_set_completed().is_ok());
    }
}
