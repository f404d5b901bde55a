#![allow(dead_code)]

use std::cell::Cell;
use std::rc::Rc;

use action_graph::browser::driver::PageDriver;
use action_graph::error::SessionError;
use serde_json::{Value, json};

/// How the in-memory driver misbehaves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fault {
    None,
    NavigateRejected,
    ExtractTimesOut,
    DriverExits,
}

/// In-memory stand-in for a browser session.
pub struct MockDriver {
    pub extraction: Value,
    pub fault: Fault,
    pub navigations: Rc<Cell<usize>>,
    pub closes: Rc<Cell<usize>>,
}

impl MockDriver {
    pub fn new(extraction: Value) -> Self {
        Self {
            extraction,
            fault: Fault::None,
            navigations: Rc::new(Cell::new(0)),
            closes: Rc::new(Cell::new(0)),
        }
    }

    pub fn failing(fault: Fault) -> Self {
        Self {
            fault,
            ..Self::new(json!([]))
        }
    }
}

impl PageDriver for MockDriver {
    fn navigate(&mut self, _url: &str) -> Result<(), SessionError> {
        self.navigations.set(self.navigations.get() + 1);
        match self.fault {
            Fault::NavigateRejected => Err(SessionError::Protocol {
                command: "navigate".into(),
                error: "net::ERR_NAME_NOT_RESOLVED".into(),
            }),
            Fault::DriverExits => Err(SessionError::Closed),
            _ => Ok(()),
        }
    }

    fn extract(&mut self) -> Result<Option<Value>, SessionError> {
        match self.fault {
            Fault::ExtractTimesOut => Ok(None),
            _ => Ok(Some(self.extraction.clone())),
        }
    }

    fn close(&mut self) {
        self.closes.set(self.closes.get() + 1);
    }
}

/// A page-level extraction record for a small login page.
pub fn login_page() -> Value {
    json!({
        "meta": {
            "url": "https://example.com/login",
            "title": "Sign in - Example",
            "status": "200",
            "canonical": "https://example.com/login",
            "meta": { "description": "Sign in to Example" }
        },
        "outline": [{ "level": 1, "text": "Sign in", "id": "heading" }],
        "forms": [{
            "id": "login",
            "action": "/session",
            "method": "post",
            "fields": [
                { "type": "email", "name": "email", "required": true },
                { "type": "password", "name": "password", "required": true }
            ]
        }],
        "links": [{ "href": "/signup", "text": "Create account" }],
        "elements": [{
            "id": "login",
            "type": "FORM",
            "tag": "form",
            "attributes": { "action": "/session" },
            "children": [
                {
                    "id": "email",
                    "type": "INPUT",
                    "tag": "input",
                    "input_type": "email",
                    "is_interactive": true,
                    "attributes": { "name": "email", "placeholder": "Email address" }
                },
                {
                    "id": "password",
                    "type": "INPUT",
                    "tag": "input",
                    "input_type": "password",
                    "is_interactive": true,
                    "attributes": { "name": "user_password" }
                },
                {
                    "id": "submit",
                    "type": "BUTTON",
                    "tag": "button",
                    "text": "Submit",
                    "is_interactive": true
                }
            ]
        }],
        "actions": [
            { "id": "email", "interactive": true, "type": "input", "input_type": "email",
              "attributes": { "name": "email", "placeholder": "Email address" } },
            { "id": "password", "interactive": true, "type": "input", "input_type": "password",
              "attributes": { "placeholder": "Password" } },
            { "id": "submit", "interactive": true, "type": "button", "text": "Submit" },
            { "id": "signup", "interactive": true, "type": "link", "text": "Create account" }
        ]
    })
}
