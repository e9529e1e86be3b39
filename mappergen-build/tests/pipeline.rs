//! End-to-end rounds against Java projects laid out on disk.

use std::fs;
use std::path::Path;

use mappergen_build::{GenerationRequest, RequestError, generate_mappers};
use tempfile::TempDir;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// A project with `com.example.model` (Order marked, Helper not) and a
/// marked `Invoice` one package further down.
fn project() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(
        root,
        "src/main/java/com/example/model/Order.java",
        r#"
        package com.example.model;

        import javax.persistence.Table;

        /** An order. {@code @Table} in docs must not count. */
        @Table(name = "orders")
        public class Order {
            private String id;
        }
        "#,
    );
    write(
        root,
        "src/main/java/com/example/model/Helper.java",
        "package com.example.model;\n\npublic class Helper {}\n",
    );
    write(
        root,
        "src/main/java/com/example/model/billing/Invoice.java",
        "package com.example.model.billing;\n\nimport javax.persistence.*;\n\n@Entity @Table public class Invoice {}\n",
    );
    dir
}

fn request() -> GenerationRequest {
    GenerationRequest::new(["com.example.model"], "com.example.mapper", "com.base.GenericMapper")
}

fn output(dir: &TempDir) -> std::path::PathBuf {
    dir.path().join("target/generated-sources/annotations")
}

#[test]
fn generates_one_mapper_per_marked_model() {
    let dir = project();
    let report = generate_mappers()
        .project_root(dir.path())
        .scan_annotations(false)
        .request(request())
        .run()
        .unwrap();

    assert!(report.claimed());
    assert!(report.is_success());
    assert_eq!(report.generated().count(), 2);

    let mapper_dir = output(&dir).join("com/example/mapper");
    let order = fs::read_to_string(mapper_dir.join("OrderMapper.java")).unwrap();
    assert_eq!(
        order,
        "package com.example.mapper;\n\
         \n\
         import com.base.GenericMapper;\n\
         import com.example.model.Order;\n\
         \n\
         public interface OrderMapper extends GenericMapper<Order> {\n\
         }\n"
    );
    assert!(mapper_dir.join("InvoiceMapper.java").exists());
    assert!(!mapper_dir.join("HelperMapper.java").exists());
}

#[test]
fn rerun_produces_identical_files() {
    let dir = project();
    let run = || {
        generate_mappers()
            .project_root(dir.path())
            .request(request().with_prefix("Sys"))
            .run()
            .unwrap()
    };

    run();
    let path = output(&dir).join("com/example/mapper/SysOrderMapper.java");
    let first = fs::read(&path).unwrap();
    let second_report = run();
    assert_eq!(fs::read(&path).unwrap(), first);
    assert!(
        second_report
            .generated()
            .all(|g| g.status == mappergen_build::WriteStatus::Unchanged)
    );
}

#[test]
fn unresolvable_package_fails_only_its_request() {
    let dir = project();
    let report = generate_mappers()
        .project_root(dir.path())
        .request(
            GenerationRequest::new(
                ["com.example.model", "com.example.nowhere"],
                "com.example.broken",
                "com.base.GenericMapper",
            )
            .with_origin("broken"),
        )
        .request(request().with_origin("valid"))
        .run()
        .unwrap();

    assert!(report.claimed());
    assert_eq!(report.outcomes.len(), 2);
    assert!(matches!(report.outcomes[0].result, Err(RequestError::Lookup(_))));
    assert!(report.outcomes[1].is_success());
    assert!(!output(&dir).join("com/example/broken").exists());
    assert!(output(&dir).join("com/example/mapper/OrderMapper.java").exists());
}

#[test]
fn reads_requests_from_annotated_sources_and_config_file() {
    let dir = project();
    write(
        dir.path(),
        "src/main/java/com/example/dao/BaseDao.java",
        r#"
        package com.example.dao;

        import com.wesd.mybatis.annotation.EnableAutoGenMapper;

        @EnableAutoGenMapper(
            modelPackageName = {"com.example.model.billing"},
            mapperPackageName = "com.example.dao.mapper",
            mapperPrefix = "Dao",
            superMapperClassName = "com.base.GenericMapper"
        )
        public class BaseDao {}
        "#,
    );
    write(
        dir.path(),
        "mappergen.toml",
        r#"
        [project]
        output_dir = "generated"

        [[mapper]]
        model_packages = ["com.example.model"]
        mapper_package = "com.example.mapper"
        base_interface = "com.base.GenericMapper"
        "#,
    );

    let report = generate_mappers().project_root(dir.path()).run().unwrap();

    let origins: Vec<_> = report.outcomes.iter().map(|o| o.origin.as_str()).collect();
    assert_eq!(origins, vec!["mappergen.toml#1", "com.example.dao.BaseDao"]);
    assert!(report.is_success());

    let generated = dir.path().join("generated");
    assert!(generated.join("com/example/mapper/OrderMapper.java").exists());
    let dao = fs::read_to_string(generated.join("com/example/dao/mapper/DaoInvoiceMapper.java")).unwrap();
    assert!(dao.contains("import com.example.model.billing.Invoice;"));
    assert!(dao.contains("public interface DaoInvoiceMapper extends GenericMapper<Invoice> {"));
}

#[test]
fn nested_models_get_flattened_names() {
    let dir = project();
    write(
        dir.path(),
        "src/main/java/com/example/model/Catalog.java",
        r#"
        package com.example.model;

        import javax.persistence.Table;

        public class Catalog {
            @Table
            public static class Item {}
        }
        "#,
    );

    let report = generate_mappers()
        .project_root(dir.path())
        .nested_models(true)
        .request(request())
        .run()
        .unwrap();

    assert!(report.is_success());
    let item = fs::read_to_string(output(&dir).join("com/example/mapper/Catalog$ItemMapper.java")).unwrap();
    assert!(item.contains("import com.example.model.Catalog;"));
    assert!(item.contains("public interface Catalog$ItemMapper extends GenericMapper<Catalog.Item> {"));
}

#[test]
fn plan_does_not_write() {
    let dir = project();
    let planned = generate_mappers()
        .project_root(dir.path())
        .request(request())
        .plan()
        .unwrap();

    assert_eq!(planned.len(), 1);
    let plan = planned[0].plan.as_ref().unwrap();
    let names: Vec<_> = plan.specs.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["OrderMapper", "InvoiceMapper"]);
    assert!(!output(&dir).exists());
}
