/// Identifier of an issued request. Larger ids were issued later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Latest-wins guard for overlapping asynchronous requests.
///
/// Only the most recently issued request is active. Its response is
/// accepted once; anything else (older ids, repeats, responses arriving
/// after [`invalidate`](Self::invalidate)) is rejected.
#[derive(Debug, Default, Clone)]
pub struct RequestSequencer {
    issued: u64,
    active: Option<RequestId>,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self) -> RequestId {
        self.issued += 1;
        let id = RequestId(self.issued);
        self.active = Some(id);
        id
    }

    /// Consumes the active slot if `id` holds it.
    pub fn accept(&mut self, id: RequestId) -> bool {
        if self.active == Some(id) {
            self.active = None;
            true
        } else {
            false
        }
    }

    /// Peeks without consuming.
    pub fn is_active(&self, id: RequestId) -> bool {
        self.active == Some(id)
    }

    pub fn invalidate(&mut self) {
        self.active = None;
    }
}
