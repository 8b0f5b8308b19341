use alloc::string::String;

use super::UpgradeError;
use crate::registry::ClassDescriptor;
use crate::{DocumentNode, ErrorHandler, TypeRegistry};

impl TypeRegistry {
    /// Rewrites a decoded document so every node matches its current class version.
    ///
    /// Nodes are processed top down. For each node:
    ///
    /// 1. a deprecated class is handed to its converter, deprecated children
    ///    without converter are dropped with a warning,
    /// 2. a node older than its class gets the field upgrades of the class,
    ///    then the version converter of the class,
    /// 3. the node is stamped with the current class version.
    ///
    /// Nodes of unregistered types are left untouched, materialization
    /// reports them. A failing converter drops the affected child with an
    /// error, a rename of a missing field fails the whole pass.
    pub fn upgrade_document(&self, node: &mut DocumentNode, errors: &mut ErrorHandler) -> Result<(), UpgradeError> {
        self.upgrade_node(node, true, errors).map(|_| ())
    }

    /// Returns `false` if `node` must be removed from its parent.
    fn upgrade_node(&self, node: &mut DocumentNode, root: bool, errors: &mut ErrorHandler) -> Result<bool, UpgradeError> {
        if let Some(class) = self.class_data(node.type_uuid())
            && class.is_deprecated()
        {
            let name = class.name();
            let version = node.version();
            match class.converter() {
                None if root => return Err(UpgradeError::DeprecatedRoot { class: name }),
                None => {
                    errors.report_warning(format_args!(
                        "`{}` is deprecated, element `{}` dropped",
                        name,
                        node.name()
                    ));
                    return Ok(false);
                }
                Some(convert) => {
                    let converted = convert(self, node)
                        && !self
                            .class_data(node.type_uuid())
                            .is_some_and(ClassDescriptor::is_deprecated);
                    if !converted {
                        return conversion_failed(name, version, root, errors);
                    }
                }
            }
        }

        if let Some(class) = self.class_data(node.type_uuid()) {
            let recorded = node.version();
            let current = class.version();
            if recorded < current {
                class.upgrades().apply(class.name(), node, current)?;
                if let Some(convert) = class.converter()
                    && !convert(self, node)
                {
                    return conversion_failed(class.name(), recorded, root, errors);
                }
                node.set_version(current);
            } else if recorded > current {
                errors.report_warning(format_args!(
                    "`{}` was written by version {recorded}, newer than the known version {current}",
                    class.name()
                ));
            }
        }

        let mut index = 0;
        while index < node.children().len() {
            let child = &mut node.children_mut()[index];
            let type_name = self.class_data(child.type_uuid()).map_or("?", ClassDescriptor::name);
            errors.push(String::from(child.name()), type_name, child.type_uuid());
            let keep = self.upgrade_node(child, false, errors);
            errors.pop();

            if keep? {
                index += 1;
            } else {
                node.children_mut().remove(index);
            }
        }
        Ok(true)
    }
}

fn conversion_failed(
    class: &'static str,
    version: u32,
    root: bool,
    errors: &mut ErrorHandler,
) -> Result<bool, UpgradeError> {
    if root {
        return Err(UpgradeError::ConversionFailed { class, version });
    }
    errors.report_error(format_args!(
        "converter of `{class}` rejected a version {version} element, element dropped"
    ));
    Ok(false)
}
