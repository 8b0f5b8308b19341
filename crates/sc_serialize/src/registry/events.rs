use crate::Object;

/// Per-class hooks around serialization and cloning.
///
/// Read hooks bracket every traversal that only reads the instance, write
/// hooks bracket every traversal that may modify it. All methods default to
/// doing nothing.
pub trait EventHandler: Send + Sync {
    fn on_read_begin(&self, instance: &dyn Object) {
        let _ = instance;
    }

    fn on_read_end(&self, instance: &dyn Object) {
        let _ = instance;
    }

    fn on_write_begin(&self, instance: &mut dyn Object) {
        let _ = instance;
    }

    fn on_write_end(&self, instance: &mut dyn Object) {
        let _ = instance;
    }

    /// Called on the fresh copy once a clone of the instance is complete.
    fn on_object_cloned(&self, instance: &mut dyn Object) {
        let _ = instance;
    }
}
