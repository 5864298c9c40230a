#![allow(dead_code)]

use indexmap::IndexMap;
use std::fs;
use std::path::{Path, PathBuf};
use template_builder::config::{Escape, Manifest};

pub const PACKAGE: &str = "demo_pkg";
pub const PROJECT: &str = "demo-project";

pub fn write(root: &Path, relative: &str, content: impl AsRef<[u8]>) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

pub fn read(root: &Path, relative: &str) -> String {
    fs::read_to_string(root.join(relative)).unwrap()
}

/// Lays out a small source project exercising every pipeline step.
pub fn make_source(root: &Path) {
    write(
        root,
        "pyproject.toml",
        "[project]\nname = \"demo-project\"\n\n[tool.setuptools]\npackages = [\"demo_pkg\"]\n",
    );
    write(
        root,
        "src/demo_pkg/__init__.py",
        "from importlib.metadata import version\n__version__ = version(\"demo_pkg\")\n",
    );
    write(root, "src/demo_pkg/demo_pkg_utils.py", "from demo_pkg import __version__\n");
    write(root, "src/demo_pkg/plain.py", "print('nothing to replace')\n");
    write(
        root,
        "src/demo_pkg/threshold_task.py",
        "# --- #{% if include_threshold %}\nprint('threshold')\n# --- #{% endif %}\n",
    );
    write(root, "src/demo_pkg/__pycache__/plain.cpython-311.pyc", [0u8, 1, 2]);
    write(root, "src/build_template/main.py", "print('demo_pkg builder')\n");
    write(
        root,
        ".github/workflows/ci.yml",
        "name: demo-project\nruns-on: ${{ matrix.os }}\n",
    );
    write(root, ".github/workflows/release.yml", "name: release\n");
    write(root, "assets/logo.bin", [0xffu8, 0xfe, 0x00, 0x64, 0x65, 0x6d, 0x6f]);
}

pub fn manifest() -> Manifest {
    Manifest {
        template_dir: PathBuf::from("template"),
        static_template_dir: PathBuf::from("static_template"),
        marker_suffix: ".jinja".to_string(),
        preserve: vec![],
        include: ["src", "pyproject.toml", ".github", "assets"]
            .into_iter()
            .map(PathBuf::from)
            .collect(),
        exclude: ["src/build_template", ".github/workflows/release.yml", "never/copied"]
            .into_iter()
            .map(PathBuf::from)
            .collect(),
        templatize: vec![PathBuf::from("pyproject.toml")],
        discover: true,
        keyword_map: IndexMap::from([
            ("package_name".to_string(), PACKAGE.to_string()),
            ("project_name".to_string(), PROJECT.to_string()),
        ]),
        escapes: vec![Escape {
            search: "{{ matrix.os }}".to_string(),
            replace: "{{ '{{' }} matrix.os {{ '}}' }}".to_string(),
        }],
        uncomment_markers: vec!["# --- #".to_string()],
        renames: vec![],
        conditional_patterns: IndexMap::from([(
            "threshold_task".to_string(),
            "include_threshold".to_string(),
        )]),
        transient_patterns: vec![],
    }
}
