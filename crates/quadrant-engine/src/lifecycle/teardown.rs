/// Holds a resource until the host tears down, then releases it exactly once.
///
/// Firing before anything was registered does nothing; firing again after a
/// release does nothing.
#[derive(Debug)]
pub struct Teardown<T> {
    resource: Option<T>,
    fired: bool,
}

impl<T> Default for Teardown<T> {
    fn default() -> Self {
        Self {
            resource: None,
            fired: false,
        }
    }
}

impl<T> Teardown<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the resource to release on teardown.
    ///
    /// Ignored (and dropped immediately) once teardown already fired.
    pub fn register(&mut self, resource: T) {
        if self.fired {
            log::warn!("teardown already fired; releasing late registration");
            return;
        }
        if self.resource.replace(resource).is_some() {
            log::warn!("teardown resource replaced before release");
        }
    }

    pub fn get(&self) -> Option<&T> {
        self.resource.as_ref()
    }

    pub fn is_registered(&self) -> bool {
        self.resource.is_some()
    }

    /// Releases the registered resource. Returns `true` if something was released.
    pub fn fire(&mut self) -> bool {
        self.fired = true;
        match self.resource.take() {
            Some(resource) => {
                drop(resource);
                true
            }
            None => false,
        }
    }
}
