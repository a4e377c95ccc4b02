//! End-to-end pipeline tests over the in-memory filesystem.

use std::path::{Path, PathBuf};

use nestling_adapters::{InMemoryStore, MemoryFilesystem, RegexAccessParser, StrictRenderer};
use nestling_core::{
    application::{
        ApplicationError, CodegenOutcome, ConflictPolicy, GenerationReport, GenerationRequest,
        GenerationService, GenerationSettings, OperationOutcome, PipelineStage,
        ports::{CodegenRequest, CodegenRunner, Filesystem, TemplateStore},
        services::FileReconciler,
    },
    domain::{
        ManifestEntry, ModuleLayout, ProjectDescriptor, Template, TemplateId, TemplateMetadata,
    },
    error::{NestlingError, NestlingResult},
};

const ROOT: &str = "/work/demo-pet";

const PET_SERVICE: &str = r#"
@Injectable()
export class PetService {
    protected basePath = 'http://petstore.swagger.io/v1';

    constructor(protected httpClient: HttpService) {}

    public listPets(limit?: number, ): Observable<AxiosResponse<Array<Pet>>>;
    public listPets(limit?: number, ): Observable<any> {
        return this.httpClient.get<Array<Pet>>(`${this.basePath}/pets`, {});
    }

    public getPet(petId: string, ): Observable<AxiosResponse<Pet>>;
    public getPet(petId: string, ): Observable<any> {
        return this.httpClient.get<Pet>(`${this.basePath}/pets/${encodeURIComponent(String(petId))}`, {});
    }
}
"#;

// ── Fixtures ──────────────────────────────────────────────────────────────────

fn base_template(extra: &[(&'static str, &'static str)]) -> Template {
    let mut b = Template::builder()
        .id(TemplateId::new("nest-modular", "1.0.0"))
        .metadata(TemplateMetadata::new("NestJS modular service"))
        .add_entry(ManifestEntry::rendered(
            "package.json",
            "{\"name\": \"{{APPLICATION}}-{{SERVICE}}\", \"version\": \"{{VERSION}}\"}",
        ))
        .add_entry(ManifestEntry::verbatim("_gitignore", "node_modules\ndist\n").to(".gitignore"))
        .add_entry(ManifestEntry::verbatim(".env", "PORT=3000\n"))
        .add_entry(ManifestEntry::verbatim(
            "src/controllers/oauth.controller.ts",
            "export class OauthController {}",
        ))
        .add_entry(ManifestEntry::verbatim(
            "src/controllers/redis.controller.ts",
            "export class RedisController {}",
        ))
        .add_entry(ManifestEntry::verbatim(
            "src/controllers/user.controller.ts",
            "export class UserController {}",
        ))
        .add_entry(ManifestEntry::verbatim(
            "src/controllers/http-client.controller.ts",
            "export class HttpClientController {}",
        ))
        .add_entry(ManifestEntry::rendered(
            "src/controllers/__service__.controller.ts",
            "export class {{SERVICE_CLASS}}Controller {}",
        ))
        .add_entry(ManifestEntry::verbatim(
            "src/interfaces/api-response.interface.ts",
            "export interface ApiResponse {}",
        ))
        .add_entry(ManifestEntry::verbatim(
            "src/interfaces/custom-request.interface.ts",
            "export interface CustomRequest {}",
        ))
        .add_entry(ManifestEntry::rendered(
            "src/modules/user/__service__.module.ts",
            "export class {{SERVICE_CLASS}}Module {}",
        ))
        .add_entry(ManifestEntry::rendered(
            "src/modules/user/__service__.service.ts",
            "export class {{SERVICE_CLASS}}DbService {}",
        ))
        .add_entry(ManifestEntry::verbatim(
            "src/database/entities/user.entity.ts",
            "export class User {}",
        ));
    for (path, content) in extra {
        b = b.add_entry(ManifestEntry::verbatim(*path, *content));
    }
    b.build().unwrap()
}

/// Generator double that writes canned files into the requested directory.
struct FakeGenerator {
    fs: MemoryFilesystem,
    files: Vec<(&'static str, &'static str)>,
    fail: bool,
}

impl CodegenRunner for FakeGenerator {
    fn generate(&self, request: &CodegenRequest) -> NestlingResult<()> {
        if self.fail {
            return Err(ApplicationError::CodegenFailed {
                reason: "generator exited with status 1".into(),
            }
            .into());
        }
        for (path, content) in &self.files {
            self.fs.seed(request.output_dir.join(path), content);
        }
        Ok(())
    }

    fn describe(&self, request: &CodegenRequest) -> String {
        format!("fake-generator -i {}", request.spec_source)
    }
}

fn petstore_output() -> Vec<(&'static str, &'static str)> {
    vec![
        ("api/pet.service.ts", PET_SERVICE),
        ("api/api.ts", "export * from './pet.service';"),
        ("model/pet.ts", "export interface Pet { id: number; }"),
        ("configuration.ts", "export class Configuration {}"),
        ("variables.ts", "export const BASE_PATH = '';"),
    ]
}

struct Harness {
    fs: MemoryFilesystem,
    service: GenerationService,
}

fn harness(
    template: Template,
    generator_files: Vec<(&'static str, &'static str)>,
    fail: bool,
) -> Harness {
    harness_with(template, generator_files, fail, GenerationSettings::default())
}

fn harness_with(
    template: Template,
    generator_files: Vec<(&'static str, &'static str)>,
    fail: bool,
    settings: GenerationSettings,
) -> Harness {
    let fs = MemoryFilesystem::new();
    let store = InMemoryStore::new();
    store.insert(template).unwrap();

    let generator = FakeGenerator {
        fs: fs.clone(),
        files: generator_files,
        fail,
    };
    let service = GenerationService::new(
        Box::new(store),
        Box::new(StrictRenderer::new()),
        Box::new(fs.clone()),
        Box::new(generator),
        Box::new(RegexAccessParser::new()),
    )
    .with_settings(settings);

    Harness { fs, service }
}

fn request(spec: Option<&str>) -> GenerationRequest {
    let mut b = ProjectDescriptor::builder().service("pet");
    if let Some(s) = spec {
        b = b.api_spec(s);
    }
    GenerationRequest::new(
        b.build().unwrap(),
        TemplateId::parse("nest-modular").unwrap(),
        "/work",
    )
}

fn path(rel: &str) -> PathBuf {
    Path::new(ROOT).join(rel)
}

fn run(h: &Harness, req: GenerationRequest) -> GenerationReport {
    h.service.generate(req).unwrap()
}

// ── No API specification ──────────────────────────────────────────────────────

#[test]
fn without_spec_keeps_default_controller_and_creates_no_model() {
    let h = harness(base_template(&[]), vec![], false);
    let report = run(&h, request(None));

    assert!(report.scaffold_complete);
    assert_eq!(report.codegen, CodegenOutcome::NotRequested);
    assert_eq!(report.destination_root, PathBuf::from(ROOT));

    let controllers = h.fs.files_under(path("src/modules/pet/controllers"));
    assert_eq!(
        controllers,
        vec![
            "http-client.controller.ts",
            "oauth.controller.ts",
            "pet.controller.ts",
            "redis.controller.ts",
            "userDb.controller.ts",
        ]
    );
    assert_eq!(
        h.fs.read_file(path("src/modules/pet/controllers/pet.controller.ts"))
            .as_deref(),
        Some("export class PetController {}")
    );
    assert!(!h.fs.exists(&path("src/modules/pet/model")));
    assert!(!h.fs.exists(&path("src/controllers")));
}

#[test]
fn without_spec_renames_base_files_and_copies_interfaces() {
    let h = harness(base_template(&[]), vec![], false);
    run(&h, request(None));

    assert_eq!(
        h.fs.read_file(path("src/modules/pet/pet.module.ts")).as_deref(),
        Some("export class PetModule {}")
    );
    assert!(h.fs.exists(&path("src/modules/pet/services/petDb.service.ts")));
    assert!(h.fs.exists(&path("src/database/entities/pet.entity.ts")));
    assert!(!h.fs.exists(&path("src/modules/user")));
    assert!(h.fs.exists(&path("src/modules/pet/interfaces/api-response.interface.ts")));
    // Copies, not moves.
    assert!(h.fs.exists(&path("src/interfaces/api-response.interface.ts")));

    assert_eq!(
        h.fs.read_file(path("package.json")).as_deref(),
        Some("{\"name\": \"demo-pet\", \"version\": \"1.0.0\"}")
    );
    assert!(h.fs.exists(&path(".gitignore")));
    assert!(!h.fs.exists(&path("_gitignore")));
}

#[test]
fn missing_template_files_are_tolerated_no_ops() {
    let h = harness(base_template(&[]), vec![], false);
    let report = run(&h, request(None));

    // The base tree ships no create-user DTO.
    assert!(report.operations.iter().any(|o| {
        o.outcome == OperationOutcome::MissingSource
            && o.operation.to_string().contains("create-user.dto.ts")
    }));
}

#[test]
fn non_empty_shared_controller_directory_is_preserved() {
    let h = harness(
        base_template(&[("src/controllers/health.controller.ts", "export class Health {}")]),
        vec![],
        false,
    );
    let report = run(&h, request(None));

    assert_eq!(
        h.fs.files_under(path("src/controllers")),
        vec!["health.controller.ts"]
    );
    assert!(report.operations.iter().any(|o| {
        o.outcome == OperationOutcome::NotEmpty && o.operation.to_string().ends_with("src/controllers")
    }));
}

// ── With API specification ────────────────────────────────────────────────────

#[test]
fn petstore_spec_synthesizes_one_controller_with_two_handlers() {
    let h = harness(base_template(&[]), petstore_output(), false);
    let report = run(&h, request(Some("./petstore.yaml")));

    assert_eq!(
        report.codegen,
        CodegenOutcome::Completed {
            merged_operations: 5,
            access_files: 1,
        }
    );
    assert_eq!(report.controllers.len(), 1);
    let controller = &report.controllers[0];
    assert_eq!(controller.path, "src/modules/pet/controllers/pet.controller.ts");
    assert_eq!(controller.class_name, "PetController");
    assert_eq!(controller.handlers, vec!["listPets", "getPet"]);

    let content = h
        .fs
        .read_file(path("src/modules/pet/controllers/pet.controller.ts"))
        .unwrap();
    assert!(content.contains("import { PetService } from '../services/pet.service';"));
    let list = content.find("listPets(").unwrap();
    let get = content.find("getPet(").unwrap();
    assert!(list < get);
}

#[test]
fn malformed_access_file_does_not_block_other_controllers() {
    let mut output = petstore_output();
    output.push(("api/zoo.service.ts", "// generator emitted no class here\n"));
    let h = harness(base_template(&[]), output, false);
    let report = run(&h, request(Some("./petstore.yaml")));

    assert_eq!(
        report.codegen,
        CodegenOutcome::Completed {
            merged_operations: 5,
            access_files: 1,
        }
    );
    assert_eq!(report.controllers.len(), 1);
    assert_eq!(report.controllers[0].handlers, vec!["listPets", "getPet"]);
    assert!(report.warnings.iter().any(|w| w.contains("zoo.service.ts")));
    assert!(h.fs.exists(&path("src/modules/pet/controllers/pet.controller.ts")));
    assert!(!h.fs.exists(&path("src/modules/pet/controllers/zoo.controller.ts")));
}

#[test]
fn petstore_spec_merges_artifacts_and_removes_temp_output() {
    let h = harness(base_template(&[]), petstore_output(), false);
    run(&h, request(Some("./petstore.yaml")));

    assert_eq!(h.fs.files_under(path("src/modules/pet/model")), vec!["pet.ts"]);
    assert_eq!(
        h.fs.files_under(path("src/modules/pet/services")),
        vec!["pet.service.ts", "petDb.service.ts"]
    );
    assert!(h.fs.exists(&path("src/modules/pet/configuration.ts")));
    assert!(h.fs.exists(&path("src/modules/pet/variables.ts")));
    assert!(!h.fs.exists(&path("src/modules/pet/app-http.config.ts")));
    assert!(!h.fs.exists(&path("__openapi-temp__")));
}

#[test]
fn petstore_spec_drops_default_controller_template() {
    let h = harness(base_template(&[]), petstore_output(), false);
    run(&h, request(Some("./petstore.yaml")));

    let controller = h
        .fs
        .read_file(path("src/modules/pet/controllers/pet.controller.ts"))
        .unwrap();
    assert_ne!(controller, "export class PetController {}");
    assert!(!h.fs.exists(&path("src/controllers")));
}

#[test]
fn codegen_failure_degrades_but_keeps_base_scaffold() {
    let h = harness(base_template(&[]), vec![], true);
    let report = run(&h, request(Some("./missing.yaml")));

    assert!(report.scaffold_complete);
    assert!(matches!(
        report.codegen,
        CodegenOutcome::Degraded {
            stage: PipelineStage::Codegen,
            ..
        }
    ));
    assert!(!report.warnings.is_empty());
    assert!(report.controllers.is_empty());

    assert!(h.fs.files_under(path("src/modules/pet/model")).is_empty());
    assert!(!h.fs.exists(&path("__openapi-temp__")));
    assert_eq!(
        h.fs.read_file(path("src/modules/pet/controllers/pet.controller.ts"))
            .as_deref(),
        Some("export class PetController {}")
    );
}

#[test]
fn generator_without_api_output_degrades_at_merge() {
    let h = harness(
        base_template(&[]),
        vec![("model/pet.ts", "export interface Pet {}")],
        false,
    );
    let report = run(&h, request(Some("./petstore.yaml")));

    assert!(matches!(
        report.codegen,
        CodegenOutcome::Degraded {
            stage: PipelineStage::Merge,
            ..
        }
    ));
    assert!(!h.fs.exists(&path("__openapi-temp__")));
    assert!(h.fs.files_under(path("src/modules/pet/model")).is_empty());
}

// ── Re-runs and conflicts ─────────────────────────────────────────────────────

#[test]
fn existing_destination_requires_force() {
    let h = harness(base_template(&[]), vec![], false);
    run(&h, request(None));

    let err = h.service.generate(request(None)).unwrap_err();
    assert!(matches!(
        err,
        NestlingError::Application(ApplicationError::DestinationExists { .. })
    ));

    let report = run(&h, request(None).force(true));
    assert!(report.scaffold_complete);
    assert!(report.operations_with(OperationOutcome::SourceDropped) >= 4);
    assert!(!h.fs.exists(&path("src/controllers")));
}

#[test]
fn reconciler_drops_sources_without_overwriting_targets() {
    let fs = MemoryFilesystem::new();
    fs.seed(path("src/controllers/oauth.controller.ts"), "new");
    fs.seed(path("src/modules/pet/controllers/oauth.controller.ts"), "edited");

    let table = ModuleLayout::new("pet").rule_table();
    let applied = FileReconciler::new(&fs, ConflictPolicy::DropSource)
        .reconcile(&table, Path::new(ROOT), false)
        .unwrap();

    assert!(
        applied
            .iter()
            .any(|o| o.outcome == OperationOutcome::SourceDropped)
    );
    assert_eq!(
        fs.read_file(path("src/modules/pet/controllers/oauth.controller.ts"))
            .as_deref(),
        Some("edited")
    );
    assert!(!fs.exists(&path("src/controllers/oauth.controller.ts")));
}

#[test]
fn fail_policy_aborts_on_relocation_conflict() {
    let h = harness_with(
        base_template(&[]),
        vec![],
        false,
        GenerationSettings {
            conflict_policy: ConflictPolicy::Fail,
            ..GenerationSettings::default()
        },
    );
    run(&h, request(None));

    let err = h.service.generate(request(None).force(true)).unwrap_err();
    assert!(matches!(
        err,
        NestlingError::Application(ApplicationError::RelocationConflict { .. })
    ));
}

#[test]
fn dry_run_leaves_memory_filesystem_empty() {
    let h = harness(base_template(&[]), petstore_output(), false);
    let report = run(&h, request(Some("./petstore.yaml")).dry_run(true));

    assert!(h.fs.list_files().is_empty());
    assert_eq!(
        report.codegen,
        CodegenOutcome::Planned {
            command: "fake-generator -i ./petstore.yaml".into()
        }
    );
}
