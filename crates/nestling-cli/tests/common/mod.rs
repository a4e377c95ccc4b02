//! Shared fixtures for the `nestling` binary tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

/// The templates shipped in the repository.
pub fn templates_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../templates")
}

/// `nestling` running inside `dir`, isolated from the user's config and logs.
pub fn nestling(dir: &TempDir) -> Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("nestling");
    cmd.current_dir(dir.path())
        .env("HOME", dir.path())
        .env("XDG_CONFIG_HOME", dir.path().join(".config"))
        .env("NESTLING_TEMPLATES_DIR", templates_dir())
        .env_remove("NESTLING_CODEGEN_BIN")
        .env_remove("RUST_LOG")
        .env_remove("NO_COLOR");
    cmd
}

/// Petstore-shaped output of the `typescript-nestjs` generator.
const STUB_GENERATOR: &str = r#"#!/bin/sh
out=""
while [ $# -gt 0 ]; do
  if [ "$1" = "-o" ]; then out="$2"; fi
  shift
done
mkdir -p "$out/api" "$out/model"
cat > "$out/api/pet.service.ts" <<'TS'
import { HttpService, Injectable } from '@nestjs/common';
import { Observable } from 'rxjs';
import { Pet } from '../model/pet';

@Injectable()
export class PetService {
    protected basePath = 'http://petstore.swagger.io/v1';

    constructor(protected httpClient: HttpService) {}

    public listPets(limit?: number, ): Observable<any> {
        return this.httpClient.get<Array<Pet>>(`${this.basePath}/pets`,
            { params: { limit } }
        );
    }

    public createPets(body: Pet, ): Observable<any> {
        return this.httpClient.post<any>(`${this.basePath}/pets`,
            body,
        );
    }

    public showPetById(petId: string, ): Observable<any> {
        return this.httpClient.get<Pet>(`${this.basePath}/pets/${encodeURIComponent(String(petId))}`,
            {}
        );
    }
}
TS
echo "export * from './pet.service';" > "$out/api/api.ts"
echo "export interface Pet { id: number; name: string; }" > "$out/model/pet.ts"
echo "export class Configuration {}" > "$out/configuration.ts"
echo "export const BASE_PATH = '';" > "$out/variables.ts"
"#;

const FAILING_GENERATOR: &str = "#!/bin/sh\necho 'Error: spec file not found' >&2\nexit 1\n";

pub fn stub_generator(dir: &TempDir) -> PathBuf {
    write_script(dir, "generator-ok", STUB_GENERATOR)
}

pub fn failing_generator(dir: &TempDir) -> PathBuf {
    write_script(dir, "generator-fail", FAILING_GENERATOR)
}

fn write_script(dir: &TempDir, name: &str, body: &str) -> PathBuf {
    let bin = dir.path().join("bin");
    fs::create_dir_all(&bin).unwrap();
    let path = bin.join(name);
    fs::write(&path, body).unwrap();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms).unwrap();
    }
    path
}
