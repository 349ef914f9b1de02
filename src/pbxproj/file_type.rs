#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildPhaseKind {
    Sources,
    Resources,
    Frameworks,
    Headers,
}

impl BuildPhaseKind {
    pub fn isa(self) -> &'static str {
        match self {
            Self::Sources => "PBXSourcesBuildPhase",
            Self::Resources => "PBXResourcesBuildPhase",
            Self::Frameworks => "PBXFrameworksBuildPhase",
            Self::Headers => "PBXHeadersBuildPhase",
        }
    }
}

/// What Xcode records about a file of a given extension, and which build
/// phase (if any) it belongs in.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FileType {
    pub last_known_file_type: &'static str,
    pub phase: Option<BuildPhaseKind>,
}

static FILE_TYPES: &[(&str, &str, Option<BuildPhaseKind>)] = &[
    ("a", "archive.ar", Some(BuildPhaseKind::Frameworks)),
    ("c", "sourcecode.c.c", Some(BuildPhaseKind::Sources)),
    ("cc", "sourcecode.cpp.cpp", Some(BuildPhaseKind::Sources)),
    ("cpp", "sourcecode.cpp.cpp", Some(BuildPhaseKind::Sources)),
    ("cxx", "sourcecode.cpp.cpp", Some(BuildPhaseKind::Sources)),
    ("dylib", "compiled.mach-o.dylib", Some(BuildPhaseKind::Frameworks)),
    ("entitlements", "text.plist.entitlements", None),
    ("framework", "wrapper.framework", Some(BuildPhaseKind::Frameworks)),
    ("gif", "image.gif", Some(BuildPhaseKind::Resources)),
    ("h", "sourcecode.c.h", Some(BuildPhaseKind::Headers)),
    ("hpp", "sourcecode.cpp.h", Some(BuildPhaseKind::Headers)),
    ("intentdefinition", "file.intentdefinition", Some(BuildPhaseKind::Sources)),
    ("jpeg", "image.jpeg", Some(BuildPhaseKind::Resources)),
    ("jpg", "image.jpeg", Some(BuildPhaseKind::Resources)),
    ("json", "text.json", Some(BuildPhaseKind::Resources)),
    ("m", "sourcecode.c.objc", Some(BuildPhaseKind::Sources)),
    ("md", "net.daringfireball.markdown", None),
    ("metal", "sourcecode.metal", Some(BuildPhaseKind::Sources)),
    ("mm", "sourcecode.cpp.objcpp", Some(BuildPhaseKind::Sources)),
    ("otf", "file", Some(BuildPhaseKind::Resources)),
    ("plist", "text.plist.xml", Some(BuildPhaseKind::Resources)),
    ("png", "image.png", Some(BuildPhaseKind::Resources)),
    ("storyboard", "file.storyboard", Some(BuildPhaseKind::Resources)),
    ("strings", "text.plist.strings", Some(BuildPhaseKind::Resources)),
    ("stringsdict", "text.plist.stringsdict", Some(BuildPhaseKind::Resources)),
    ("swift", "sourcecode.swift", Some(BuildPhaseKind::Sources)),
    ("tbd", "sourcecode.text-based-dylib-definition", Some(BuildPhaseKind::Frameworks)),
    ("ttf", "file", Some(BuildPhaseKind::Resources)),
    ("xcassets", "folder.assetcatalog", Some(BuildPhaseKind::Resources)),
    ("xcconfig", "text.xcconfig", None),
    ("xcdatamodeld", "wrapper.xcdatamodeld", Some(BuildPhaseKind::Sources)),
    ("xcframework", "wrapper.xcframework", Some(BuildPhaseKind::Frameworks)),
    ("xcstrings", "text.json.xcstrings", Some(BuildPhaseKind::Resources)),
    ("xib", "file.xib", Some(BuildPhaseKind::Resources)),
];

impl FileType {
    pub const UNKNOWN: Self = Self {
        last_known_file_type: "file",
        phase: Some(BuildPhaseKind::Resources),
    };

    pub fn from_path(path: &str) -> Self {
        let file_name = path.rsplit('/').next().unwrap_or(path);
        file_name
            .rsplit_once('.')
            .filter(|(stem, _)| !stem.is_empty())
            .and_then(|(_, ext)| {
                let ext = ext.to_ascii_lowercase();
                FILE_TYPES.iter().find(|(known, ..)| *known == ext)
            })
            .map(|&(_, last_known_file_type, phase)| Self {
                last_known_file_type,
                phase,
            })
            .unwrap_or(Self::UNKNOWN)
    }
}
