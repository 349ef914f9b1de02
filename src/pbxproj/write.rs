use super::plist::{quote, Dict, Value};
use std::{
    collections::{BTreeMap, HashMap},
    fmt::Write as _,
};

static HEADER: &str = "// !$*UTF8*$!\n";

// Xcode keeps these on a single line no matter how many keys they have.
static INLINE_ISAS: &[&str] = &["PBXBuildFile", "PBXFileReference"];

// Values under these keys are object ids, but Xcode never annotates them.
static UNCOMMENTED_KEYS: &[&str] = &["remoteGlobalIDString", "TestTargetID"];

fn isa(object: &Dict) -> Option<&str> {
    object.get("isa").and_then(Value::as_str)
}

fn str_field<'a>(object: &'a Dict, key: &str) -> Option<&'a str> {
    object.get(key).and_then(Value::as_str)
}

fn phase_name(object: &Dict) -> Option<&str> {
    str_field(object, "name").or(match isa(object)? {
        "PBXSourcesBuildPhase" => Some("Sources"),
        "PBXFrameworksBuildPhase" => Some("Frameworks"),
        "PBXResourcesBuildPhase" => Some("Resources"),
        "PBXHeadersBuildPhase" => Some("Headers"),
        "PBXCopyFilesBuildPhase" => Some("CopyFiles"),
        "PBXShellScriptBuildPhase" => Some("ShellScript"),
        "PBXRezBuildPhase" => Some("Rez"),
        _ => None,
    })
}

fn is_build_phase(object: &Dict) -> bool {
    isa(object).map_or(false, |isa| isa.ends_with("BuildPhase"))
}

/// Builds the `/* ... */` annotation Xcode writes after each object id.
fn comments(objects: &Dict, project_name: &str) -> HashMap<String, String> {
    let as_object = |id: &str| objects.get(id).and_then(Value::as_dict);

    let mut phase_of_build_file = HashMap::new();
    let mut owner_of_configuration_list = HashMap::new();
    let mut folder_of_exception_set = HashMap::new();
    for object in objects.values() {
        let object = match object.as_dict() {
            Some(object) => object,
            None => continue,
        };
        if is_build_phase(object) {
            if let Some(name) = phase_name(object) {
                let files = object.get("files").and_then(Value::as_array).unwrap_or(&[]);
                for file in files.iter().filter_map(Value::as_str) {
                    phase_of_build_file.insert(file, name);
                }
            }
        }
        if let Some(list) = str_field(object, "buildConfigurationList") {
            owner_of_configuration_list.insert(list, object);
        }
        if let Some(folder) = str_field(object, "path").or_else(|| str_field(object, "name")) {
            let exceptions = object.get("exceptions").and_then(Value::as_array).unwrap_or(&[]);
            for set in exceptions.iter().filter_map(Value::as_str) {
                folder_of_exception_set.insert(set, folder);
            }
        }
    }

    let plain_name = |object: &Dict| -> Option<String> {
        match isa(object)? {
            "PBXProject" => Some("Project object".to_owned()),
            "PBXContainerItemProxy" | "PBXTargetDependency" => isa(object).map(str::to_owned),
            "XCSwiftPackageProductDependency" => str_field(object, "productName").map(str::to_owned),
            "XCRemoteSwiftPackageReference" => {
                let url = str_field(object, "repositoryURL")?;
                let repo = url.trim_end_matches('/').rsplit('/').next().unwrap_or(url);
                Some(format!(
                    "XCRemoteSwiftPackageReference \"{}\"",
                    repo.trim_end_matches(".git")
                ))
            }
            _ if is_build_phase(object) => phase_name(object).map(str::to_owned),
            _ => str_field(object, "name")
                .or_else(|| str_field(object, "path"))
                .map(str::to_owned),
        }
    };

    let mut comments = HashMap::new();
    for (id, object) in objects {
        let object = match object.as_dict() {
            Some(object) => object,
            None => continue,
        };
        let comment = match isa(object) {
            Some("PBXBuildFile") => {
                let file = str_field(object, "fileRef")
                    .or_else(|| str_field(object, "productRef"))
                    .and_then(as_object)
                    .and_then(plain_name);
                match (file, phase_of_build_file.get(id.as_str())) {
                    (Some(file), Some(phase)) => Some(format!("{} in {}", file, phase)),
                    (file, _) => file,
                }
            }
            Some("XCConfigurationList") => owner_of_configuration_list
                .get(id.as_str())
                .and_then(|owner| {
                    let owner_isa = isa(owner)?;
                    let owner_name = if owner_isa == "PBXProject" {
                        project_name
                    } else {
                        str_field(owner, "name")?
                    };
                    Some(format!(
                        "Build configuration list for {} \"{}\"",
                        owner_isa, owner_name
                    ))
                }),
            Some("PBXFileSystemSynchronizedBuildFileExceptionSet") => {
                let folder = folder_of_exception_set.get(id.as_str());
                let target = str_field(object, "target")
                    .and_then(as_object)
                    .and_then(|target| str_field(target, "name"));
                match (folder, target) {
                    (Some(folder), Some(target)) => Some(format!(
                        "Exceptions for \"{}\" folder in \"{}\" target",
                        folder, target
                    )),
                    _ => None,
                }
            }
            _ => plain_name(object),
        };
        if let Some(comment) = comment {
            comments.insert(id.clone(), comment);
        }
    }
    comments
}

struct Writer {
    out: String,
    comments: HashMap<String, String>,
}

impl Writer {
    fn indent(&mut self, level: usize) {
        for _ in 0..level {
            self.out.push('\t');
        }
    }

    fn string(&mut self, s: &str, commented: bool) {
        self.out.push_str(&quote(s));
        if commented {
            if let Some(comment) = self.comments.get(s) {
                let _ = write!(self.out, " /* {} */", comment);
            }
        }
    }

    fn value(&mut self, value: &Value, level: usize, inline: bool, commented: bool) {
        match value {
            Value::String(s) => self.string(s, commented),
            Value::Data(bytes) => {
                let _ = write!(self.out, "<{}>", hex::encode(bytes));
            }
            Value::Array(items) => {
                self.out.push('(');
                if !inline {
                    self.out.push('\n');
                }
                for item in items {
                    if inline {
                        self.value(item, level + 1, true, commented);
                        self.out.push_str(", ");
                    } else {
                        self.indent(level + 1);
                        self.value(item, level + 1, false, commented);
                        self.out.push_str(",\n");
                    }
                }
                if !inline {
                    self.indent(level);
                }
                self.out.push(')');
            }
            Value::Dict(dict) => {
                let entries = dict.iter().map(|(k, v)| (k.as_str(), v)).collect::<Vec<_>>();
                self.dict(&entries, level, inline)
            }
        }
    }

    fn dict(&mut self, entries: &[(&str, &Value)], level: usize, inline: bool) {
        self.out.push('{');
        if !inline {
            self.out.push('\n');
        }
        for (key, value) in entries {
            let commented = !UNCOMMENTED_KEYS.contains(key);
            if inline {
                self.string(key, false);
                self.out.push_str(" = ");
                self.value(value, level + 1, true, commented);
                self.out.push_str("; ");
            } else {
                self.indent(level + 1);
                self.string(key, false);
                self.out.push_str(" = ");
                self.value(value, level + 1, false, commented);
                self.out.push_str(";\n");
            }
        }
        if !inline {
            self.indent(level);
        }
        self.out.push('}');
    }

    fn object(&mut self, object: &Dict, level: usize, inline: bool) {
        let mut entries = object
            .iter()
            .map(|(k, v)| (k.as_str(), v))
            .collect::<Vec<_>>();
        entries.sort_by(|(a, _), (b, _)| (*a != "isa").cmp(&(*b != "isa")).then(a.cmp(b)));
        self.dict(&entries, level, inline)
    }

    fn objects(&mut self, objects: &Dict) {
        let mut sections = BTreeMap::<&str, Vec<(&str, &Value)>>::new();
        for (id, object) in objects {
            let isa = object.as_dict().and_then(isa).unwrap_or_default();
            sections.entry(isa).or_default().push((id.as_str(), object));
        }
        self.out.push_str("{\n");
        for (isa, mut entries) in sections {
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));
            let _ = write!(self.out, "\n/* Begin {} section */\n", isa);
            let inline = INLINE_ISAS.contains(&isa);
            for (id, object) in entries {
                self.indent(2);
                self.string(id, true);
                self.out.push_str(" = ");
                match object {
                    Value::Dict(object) => self.object(object, 2, inline),
                    other => self.value(other, 2, inline, true),
                }
                self.out.push_str(";\n");
            }
            let _ = write!(self.out, "/* End {} section */\n", isa);
        }
        self.indent(1);
        self.out.push('}');
    }
}

/// Serializes a project document in Xcode's own layout, so that saving an
/// untouched project reproduces it.
pub fn write_project(root: &Dict, project_name: &str) -> String {
    let objects = root.get("objects").and_then(Value::as_dict);
    let mut writer = Writer {
        out: String::from(HEADER),
        comments: objects
            .map(|objects| comments(objects, project_name))
            .unwrap_or_default(),
    };
    writer.out.push_str("{\n");
    for (key, value) in root {
        writer.indent(1);
        writer.string(key, false);
        writer.out.push_str(" = ");
        match value {
            Value::Dict(objects) if key == "objects" => writer.objects(objects),
            other => writer.value(other, 1, false, true),
        }
        writer.out.push_str(";\n");
    }
    writer.out.push_str("}\n");
    writer.out
}
