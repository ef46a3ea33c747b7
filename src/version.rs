//! 版本信息模块
//! 汇集编译时注入的构建字段与运行时采集的字段，支持模板文本渲染与 JSON 序列化。

use std::io::Write;

use chrono::{Local, SecondsFormat};
use minijinja::{Environment, UndefinedBehavior};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::build_info;

/// 默认模板：标签左对齐
pub const DEFAULT_TEMPLATE: &str = "
{{ program_name }} ({{ comment }})
\tVERSION          : {{ version }}
\tINTERNAL_VERSION : {{ internal_version }}
\tBRANCH           : {{ branch }}
\tHASH             : {{ hash }}
\tBUILD_TIME       : {{ build_time }}
\tRUST_VERSION     : {{ rust_version }}
\tWORK_DIR         : {{ work_dir }}
\tRUN_TIME         : {{ run_time }}
";

/// 备选模板：标签右对齐
pub const DEFAULT_TEMPLATE2: &str = "
{{ program_name }} ({{ comment }})
\t         VERSION : {{ version }}
\tINTERNAL_VERSION : {{ internal_version }}
\t          BRANCH : {{ branch }}
\t            HASH : {{ hash }}
\t      BUILD_TIME : {{ build_time }}
\t    RUST_VERSION : {{ rust_version }}
\t        WORK_DIR : {{ work_dir }}
\t        RUN_TIME : {{ run_time }}
";

/// 版本信息处理错误
#[derive(Debug, thiserror::Error)]
pub enum VersionError {
    /// 构造阶段唯一的失败来源：工作目录不可读；CLI 输出阶段的写失败也归于此类
    #[error("I/O 错误: {0}")]
    Io(#[from] std::io::Error),
    #[error("模板解析或渲染失败: {0}")]
    Template(#[from] minijinja::Error),
    #[error("JSON 序列化失败: {0}")]
    Json(#[from] serde_json::Error),
}

/// 编译时注入字段的集合，构造时整体传入，测试场景可替换
#[derive(Debug, Clone, Copy)]
pub struct BuildFields {
    pub version: &'static str,
    pub branch: &'static str,
    pub hash: &'static str,
    pub build_time: &'static str,
    pub comment: &'static str,
}

/// 进程级注入值，由 build.rs 在编译时写入
pub const INJECTED: BuildFields = BuildFields {
    version: build_info::VERSION,
    branch: build_info::BRANCH,
    hash: build_info::COMMIT,
    build_time: build_info::BUILD_TIMESTAMP,
    comment: build_info::COMMENT,
};

/// 程序版本信息。除 `template` 外构造后不再变化。
#[derive(Debug, Clone, Serialize)]
pub struct VersionInfo {
    // 编译时注入的值
    pub version: String,
    pub branch: String,
    pub hash: String,
    pub build_time: String,
    pub comment: String,

    // 运行时的值
    pub program_name: String,
    pub internal_version: String,
    pub rust_version: String,
    pub work_dir: String,
    pub run_time: String,

    /// 渲染模板，为空则使用默认模板。只影响文本输出，不参与 JSON 序列化。
    #[serde(skip)]
    pub template: String,
}

impl VersionInfo {
    /// 以进程级注入值构造版本信息。唯一可能的失败是工作目录不可读。
    pub fn new(
        program_name: impl Into<String>,
        internal_version: impl Into<String>,
    ) -> Result<Self, VersionError> {
        Self::with_fields(INJECTED, program_name, internal_version)
    }

    /// 以显式构建字段构造，测试场景使用。
    pub fn with_fields(
        fields: BuildFields,
        program_name: impl Into<String>,
        internal_version: impl Into<String>,
    ) -> Result<Self, VersionError> {
        let work_dir = std::env::current_dir()?;
        Ok(Self {
            version: fields.version.to_string(),
            branch: fields.branch.to_string(),
            hash: fields.hash.to_string(),
            build_time: fields.build_time.to_string(),
            comment: fields.comment.to_string(),
            program_name: program_name.into(),
            internal_version: internal_version.into(),
            rust_version: build_info::RUSTC_VERSION.to_string(),
            work_dir: work_dir.to_string_lossy().into_owned(),
            run_time: Local::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            template: String::new(),
        })
    }

    /// 按模板渲染为多行文本。占位符按字段名绑定，未知占位符视为错误。
    pub fn render(&self) -> Result<String, VersionError> {
        let tpl = if self.template.is_empty() {
            DEFAULT_TEMPLATE
        } else {
            self.template.as_str()
        };

        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        // 模板末尾的换行是输出的一部分
        env.set_keep_trailing_newline(true);

        let compiled = env.template_from_str(tpl)?;
        Ok(compiled.render(self)?)
    }

    /// 紧凑 JSON 文档，字段顺序与声明一致。
    pub fn to_json(&self) -> Result<Vec<u8>, VersionError> {
        Ok(serde_json::to_vec(self)?)
    }

    /// 制表符缩进的美化 JSON 文档，内容与紧凑形式一致。
    pub fn to_pretty_json(&self) -> Result<Vec<u8>, VersionError> {
        let mut buf = Vec::new();
        let formatter = PrettyFormatter::with_indent(b"\t");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)?;
        Ok(buf)
    }
}

/// 渲染默认模板并写入标准输出。出错时由调用方以非零状态退出，不输出残缺内容。
pub fn print_version(program_name: &str, internal_version: &str) -> Result<(), VersionError> {
    let info = VersionInfo::new(program_name, internal_version)?;
    let rendered = info.render()?;

    let mut stdout = std::io::stdout();
    stdout.write_all(rendered.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    const TEST_FIELDS: BuildFields = BuildFields {
        version: "v1.0.0",
        branch: "master",
        hash: "1234567",
        build_time: "2020/01/07 11:18:00",
        comment: "build from unit test",
    };

    fn test_info() -> VersionInfo {
        VersionInfo::with_fields(TEST_FIELDS, "unit-test", "v0.0.1").expect("construct version info")
    }

    #[test]
    fn default_template_renders_injected_fields_verbatim() {
        let info = test_info();

        let expected = format!(
            "\nunit-test (build from unit test)\n\
             \tVERSION          : v1.0.0\n\
             \tINTERNAL_VERSION : v0.0.1\n\
             \tBRANCH           : master\n\
             \tHASH             : 1234567\n\
             \tBUILD_TIME       : 2020/01/07 11:18:00\n\
             \tRUST_VERSION     : {}\n\
             \tWORK_DIR         : {}\n\
             \tRUN_TIME         : {}\n",
            info.rust_version, info.work_dir, info.run_time
        );

        let actual = info.render().expect("render default template");
        assert_eq!(actual, expected);
        assert!(!actual.contains("{{"), "渲染结果不应残留占位符");
    }

    #[test]
    fn rendering_same_record_twice_is_deterministic() {
        let info = test_info();
        let first = info.render().expect("first render");
        let second = info.render().expect("second render");
        assert_eq!(first, second);
    }

    #[test]
    fn second_template_carries_same_values_with_right_aligned_labels() {
        let mut info = test_info();
        info.template = DEFAULT_TEMPLATE2.to_string();

        let rendered = info.render().expect("render second template");
        assert!(rendered.contains("\t         VERSION : v1.0.0\n"));
        assert!(rendered.contains("\tINTERNAL_VERSION : v0.0.1\n"));
        assert!(rendered.contains("\t          BRANCH : master\n"));
    }

    #[test]
    fn custom_template_changes_text_output_only() {
        let mut info = test_info();
        info.template = "{{ program_name }}@{{ internal_version }}".to_string();

        assert_eq!(info.render().expect("render custom template"), "unit-test@v0.0.1");

        // JSON 输出不受模板影响
        let doc: Value =
            serde_json::from_slice(&info.to_json().expect("to_json")).expect("parse json");
        assert_eq!(doc["program_name"], "unit-test");
        assert_eq!(doc["version"], "v1.0.0");
    }

    #[test]
    fn unknown_placeholder_fails_instead_of_substituting_empty() {
        let mut info = test_info();
        info.template = "{{ no_such_field }}".to_string();

        assert!(matches!(info.render(), Err(VersionError::Template(_))));
    }

    #[test]
    fn malformed_template_is_a_template_error() {
        let mut info = test_info();
        info.template = "{{ program_name".to_string();

        assert!(matches!(info.render(), Err(VersionError::Template(_))));
    }

    #[test]
    fn compact_and_pretty_documents_carry_identical_fields() {
        let info = test_info();

        let compact = info.to_json().expect("compact json");
        let pretty = info.to_pretty_json().expect("pretty json");

        let compact_doc: Value = serde_json::from_slice(&compact).expect("parse compact");
        let pretty_doc: Value = serde_json::from_slice(&pretty).expect("parse pretty");
        assert_eq!(compact_doc, pretty_doc);

        // 紧凑形式不含多余空白，美化形式以制表符缩进
        assert!(!compact.contains(&b'\n'));
        assert!(pretty.windows(2).any(|w| w == b"\n\t"));
    }

    #[test]
    fn template_field_never_appears_in_documents() {
        let mut info = test_info();
        info.template = "{{ program_name }}".to_string();

        for bytes in [
            info.to_json().expect("compact json"),
            info.to_pretty_json().expect("pretty json"),
        ] {
            let doc: Value = serde_json::from_slice(&bytes).expect("parse document");
            let obj = doc.as_object().expect("document is an object");
            assert!(!obj.contains_key("template"));
            assert_eq!(obj.len(), 10);
        }
    }

    #[test]
    fn compact_document_preserves_declared_field_order() {
        let info = test_info();
        let text = String::from_utf8(info.to_json().expect("compact json")).expect("utf8");

        let keys = [
            "\"version\"",
            "\"branch\"",
            "\"hash\"",
            "\"build_time\"",
            "\"comment\"",
            "\"program_name\"",
            "\"internal_version\"",
            "\"rust_version\"",
            "\"work_dir\"",
            "\"run_time\"",
        ];
        let positions: Vec<usize> = keys
            .iter()
            .map(|key| text.find(key).unwrap_or_else(|| panic!("missing key {key}")))
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn records_from_same_fields_differ_only_in_program_name() {
        let a = VersionInfo::with_fields(TEST_FIELDS, "prog-a", "v0.0.1").expect("construct a");
        let b = VersionInfo::with_fields(TEST_FIELDS, "prog-b", "v0.0.1").expect("construct b");

        assert_ne!(a.program_name, b.program_name);
        assert_eq!(a.version, b.version);
        assert_eq!(a.branch, b.branch);
        assert_eq!(a.hash, b.hash);
        assert_eq!(a.build_time, b.build_time);
        assert_eq!(a.comment, b.comment);
        assert_eq!(a.internal_version, b.internal_version);
        assert_eq!(a.rust_version, b.rust_version);
        assert_eq!(a.work_dir, b.work_dir);
    }

    #[test]
    fn run_time_is_rfc3339_with_offset() {
        let info = test_info();
        chrono::DateTime::parse_from_rfc3339(&info.run_time).expect("run_time parses as rfc3339");
    }
}
