//! The module layout of a generated service and the rules that shape it.
//!
//! Everything here is a pure function of the service name: which directories
//! exist under `src/modules/{service}`, which base-tree files move where, and
//! which codegen artifacts get merged into the module.

use std::path::{Path, PathBuf};

use crate::domain::entities::file_operation::{
    FileOperation, RuleClass, RuleCondition, RuleTable,
};

/// Shared controller directory every template variant writes into.
pub const SHARED_CONTROLLERS_DIR: &str = "src/controllers";

/// Placeholder module directory the base files are renamed out of.
pub const BASE_MODULE_DIR: &str = "src/modules/user";

/// The service's default controller, kept only without an API spec.
pub const DEFAULT_CONTROLLER_SOURCE: &str = "src/controllers/__service__.controller.ts";

/// Controllers relocated into every module: `(source, target file name)`.
pub const FIXED_CONTROLLERS: [(&str, &str); 4] = [
    ("src/controllers/oauth.controller.ts", "oauth.controller.ts"),
    ("src/controllers/redis.controller.ts", "redis.controller.ts"),
    ("src/controllers/user.controller.ts", "userDb.controller.ts"),
    (
        "src/controllers/http-client.controller.ts",
        "http-client.controller.ts",
    ),
];

/// Interface definitions copied from the base tree into the module.
pub const SHARED_INTERFACES_DIR: &str = "src/interfaces";
pub const MODULE_INTERFACE_FILES: [&str; 2] =
    ["api-response.interface.ts", "custom-request.interface.ts"];

/// Configuration files the generator may emit at its output root.
pub const CODEGEN_CONFIG_FILES: [&str; 3] = ["configuration.ts", "app-http.config.ts", "variables.ts"];

/// Aggregator re-exporting every access file; superseded by synthesized controllers.
pub const REDUNDANT_AGGREGATOR: &str = "api.ts";

/// Codegen output subtree → module subdirectory.
pub const CODEGEN_MODEL_DIR: &str = "model";
pub const CODEGEN_API_DIR: &str = "api";

/// Paths of one service module, relative to the destination root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleLayout {
    service: String,
}

impl ModuleLayout {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    /// `src/modules/{service}`
    pub fn module_dir(&self) -> PathBuf {
        PathBuf::from("src/modules").join(&self.service)
    }

    pub fn controllers_dir(&self) -> PathBuf {
        self.module_dir().join("controllers")
    }

    pub fn services_dir(&self) -> PathBuf {
        self.module_dir().join("services")
    }

    pub fn interfaces_dir(&self) -> PathBuf {
        self.module_dir().join("interfaces")
    }

    pub fn model_dir(&self) -> PathBuf {
        self.module_dir().join("model")
    }

    /// `{service}.controller.ts`
    pub fn default_controller_name(&self) -> String {
        format!("{}.controller.ts", self.service)
    }

    /// Hand-written persistence service renamed from the base tree.
    ///
    /// It lives in `services/` next to generated access files but is not one.
    pub fn base_service_file_name(&self) -> String {
        format!("{}Db.service.ts", self.service)
    }

    /// Directories and interface copies the scaffold writer performs after
    /// rendering, relative to the destination root.
    pub fn scaffold_operations(&self) -> Vec<FileOperation> {
        let mut ops = vec![
            FileOperation::mkdir(self.controllers_dir()),
            FileOperation::mkdir(self.services_dir()),
            FileOperation::mkdir(self.interfaces_dir()),
        ];
        ops.extend(MODULE_INTERFACE_FILES.iter().map(|name| {
            FileOperation::copy(
                Path::new(SHARED_INTERFACES_DIR).join(name),
                self.interfaces_dir().join(name),
            )
        }));
        ops
    }

    /// The reconciliation rules for this service.
    pub fn rule_table(&self) -> RuleTable {
        let s = &self.service;
        let controllers = self.controllers_dir();

        // Deletion of the default controller is declared before any move.
        let mut table = RuleTable::new().rule(
            RuleClass::ControllerRelocation,
            RuleCondition::HasApiSpec,
            FileOperation::delete(DEFAULT_CONTROLLER_SOURCE),
        );

        for (source, target) in FIXED_CONTROLLERS {
            table = table.rule(
                RuleClass::ControllerRelocation,
                RuleCondition::Always,
                FileOperation::move_to(source, controllers.join(target)),
            );
        }

        table
            .rule(
                RuleClass::ControllerRelocation,
                RuleCondition::NoApiSpec,
                FileOperation::move_to(
                    DEFAULT_CONTROLLER_SOURCE,
                    controllers.join(self.default_controller_name()),
                ),
            )
            .rule(
                RuleClass::DirectoryPruning,
                RuleCondition::Always,
                FileOperation::rmdir_if_empty(SHARED_CONTROLLERS_DIR),
            )
            .rule(
                RuleClass::BaseFileRenaming,
                RuleCondition::Always,
                FileOperation::move_to(
                    Path::new(BASE_MODULE_DIR).join("__service__.module.ts"),
                    self.module_dir().join(format!("{s}.module.ts")),
                ),
            )
            .rule(
                RuleClass::BaseFileRenaming,
                RuleCondition::Always,
                FileOperation::move_to(
                    Path::new(BASE_MODULE_DIR).join("__service__.service.ts"),
                    self.services_dir().join(self.base_service_file_name()),
                ),
            )
            .rule(
                RuleClass::BaseFileRenaming,
                RuleCondition::Always,
                FileOperation::move_to(
                    "src/modules/example/dto/create-user.dto.ts",
                    self.model_dir().join(format!("{s}Db.ts")),
                ),
            )
            .rule(
                RuleClass::BaseFileRenaming,
                RuleCondition::Always,
                FileOperation::move_to(
                    "src/database/entities/user.entity.ts",
                    format!("src/database/entities/{s}.entity.ts"),
                ),
            )
            .rule(
                RuleClass::BaseFileRenaming,
                RuleCondition::Always,
                FileOperation::rmdir_if_empty(BASE_MODULE_DIR),
            )
    }

    /// Merge steps from a codegen output root into the module, absolute.
    ///
    /// `module_root` is the absolute module directory.
    pub fn merge_operations(&self, output_root: &Path, module_root: &Path) -> Vec<FileOperation> {
        let mut ops = vec![
            FileOperation::copy(
                output_root.join(CODEGEN_MODEL_DIR),
                module_root.join("model"),
            ),
            FileOperation::copy(
                output_root.join(CODEGEN_API_DIR),
                module_root.join("services"),
            ),
        ];
        ops.extend(
            CODEGEN_CONFIG_FILES
                .iter()
                .map(|name| FileOperation::copy(output_root.join(name), module_root.join(name))),
        );
        ops.push(FileOperation::delete(
            module_root.join("services").join(REDUNDANT_AGGREGATOR),
        ));
        ops
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ops_for(has_spec: bool) -> Vec<String> {
        ModuleLayout::new("pet")
            .rule_table()
            .resolve(Path::new("demo-pet"), has_spec)
            .into_iter()
            .map(|(_, op)| op.to_string())
            .collect()
    }

    #[test]
    fn builtin_rule_table_is_total() {
        assert!(ModuleLayout::new("pet").rule_table().validate().is_ok());
    }

    #[test]
    fn no_spec_branch_relocates_default_controller() {
        let ops = ops_for(false);
        assert!(ops.contains(
            &"move demo-pet/src/controllers/__service__.controller.ts -> demo-pet/src/modules/pet/controllers/pet.controller.ts"
                .to_string()
        ));
        assert!(!ops.iter().any(|o| o.starts_with("delete")));
    }

    #[test]
    fn spec_branch_deletes_default_controller_first() {
        let ops = ops_for(true);
        assert_eq!(
            ops[0],
            "delete demo-pet/src/controllers/__service__.controller.ts"
        );
        assert!(!ops.iter().any(|o| o.contains("pet.controller.ts")));
    }

    #[test]
    fn pruning_runs_after_relocation_and_before_renames() {
        let ops = ops_for(false);
        let prune = ops.iter().position(|o| o.starts_with("rmdir")).unwrap();
        let last_controller_move = ops
            .iter()
            .rposition(|o| o.contains("/controllers/"))
            .unwrap();
        let first_rename = ops.iter().position(|o| o.contains("__service__.module")).unwrap();
        assert!(last_controller_move < prune);
        assert!(prune < first_rename);
    }

    #[test]
    fn placeholder_module_dir_pruned_after_renames() {
        let ops = ops_for(false);
        let last_rename = ops.iter().rposition(|o| o.contains("entities/user.entity.ts")).unwrap();
        assert_eq!(
            ops.last().unwrap(),
            "rmdir-if-empty demo-pet/src/modules/user"
        );
        assert!(last_rename < ops.len() - 1);
    }

    #[test]
    fn fixed_controllers_get_fixed_names() {
        let ops = ops_for(true);
        assert!(ops.iter().any(|o| o.ends_with("controllers/userDb.controller.ts")));
        assert_eq!(ops.iter().filter(|o| o.starts_with("move")).count(), 8);
    }

    #[test]
    fn merge_plan_ends_with_aggregator_delete() {
        let layout = ModuleLayout::new("pet");
        let ops = layout.merge_operations(Path::new("/tmp/out"), Path::new("/p/src/modules/pet"));
        assert_eq!(ops.len(), 6);
        assert_eq!(
            ops.last().unwrap(),
            &FileOperation::delete("/p/src/modules/pet/services/api.ts")
        );
    }
}
