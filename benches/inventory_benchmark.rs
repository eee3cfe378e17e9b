//! Inventory benchmarks
//!
//! 1. PARSING:
//!    - INI and YAML inventories at 10/100/1000/10000 hosts
//!    - Directory inventories with group_vars/ and host_vars/
//!
//! 2. QUERIES:
//!    - Host patterns (group, glob, regex, union, exclusion)
//!    - Effective variable resolution through the group hierarchy
//!
//! 3. WRITING:
//!    - INI rendering

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rustible_inventory::inventory::{to_ini_string, Inventory};
use std::fs;

/// Generate inventory YAML with specified number of hosts and groups
fn generate_large_inventory_yaml(num_hosts: usize, num_groups: usize) -> String {
    let hosts_per_group = (num_hosts / num_groups).max(1);
    let mut yaml = String::from("all:\n  children:\n");

    for g in 0..num_groups {
        yaml.push_str(&format!("    group_{:04}:\n      hosts:\n", g));
        let start = g * hosts_per_group;
        let end = ((g + 1) * hosts_per_group).min(num_hosts);
        for h in start..end {
            yaml.push_str(&format!(
                "        host{:05}:\n          ansible_host: 10.{}.{}.{}\n          http_port: {}\n",
                h,
                (h / 65536) % 256,
                (h / 256) % 256,
                h % 256,
                8080 + (h % 100)
            ));
        }
        yaml.push_str(&format!("      vars:\n        group_id: {}\n", g));
    }

    yaml.push_str("  vars:\n    global_var: production\n");
    yaml
}

/// Generate INI format inventory with a parent group over every group
fn generate_large_inventory_ini(num_hosts: usize) -> String {
    let groups = ["webservers", "databases", "caches", "loadbalancers"];
    let hosts_per_group = (num_hosts / groups.len()).max(1);
    let mut ini = String::new();

    for (idx, group) in groups.iter().enumerate() {
        ini.push_str(&format!("[{}]\n", group));
        for h in 0..hosts_per_group {
            let host_id = idx * hosts_per_group + h;
            ini.push_str(&format!(
                "{}_{:04} ansible_host=10.{}.{}.{} http_port={}\n",
                group,
                h,
                (host_id / 65536) % 256,
                (host_id / 256) % 256,
                host_id % 256,
                8080 + (h % 100)
            ));
        }
        ini.push_str(&format!("\n[{}:vars]\ntier={}\n\n", group, idx));
    }

    ini.push_str("[production:children]\n");
    for group in &groups {
        ini.push_str(group);
        ini.push('\n');
    }
    ini.push_str("\n[production:vars]\nenv=prod\n\n[all:vars]\nntp_server=pool.ntp.org\n");
    ini
}

fn bench_inventory_parsing_scale(c: &mut Criterion) {
    let mut group = c.benchmark_group("inventory_parsing_scale");
    group.sample_size(20);

    for num_hosts in [10, 100, 1000, 10000].iter() {
        if *num_hosts > 1000 {
            group.sample_size(10);
        }
        group.throughput(Throughput::Elements(*num_hosts as u64));

        let ini = generate_large_inventory_ini(*num_hosts);
        group.bench_with_input(BenchmarkId::new("ini", num_hosts), &ini, |b, content| {
            b.iter(|| black_box(Inventory::from_ini(black_box(content))))
        });

        let yaml = generate_large_inventory_yaml(*num_hosts, (*num_hosts / 50).max(1));
        group.bench_with_input(BenchmarkId::new("yaml", num_hosts), &yaml, |b, content| {
            b.iter(|| black_box(Inventory::from_yaml(black_box(content))))
        });
    }

    group.finish();
}

fn bench_directory_loading(c: &mut Criterion) {
    let mut group = c.benchmark_group("inventory_directory");

    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("hosts"), generate_large_inventory_ini(1000)).unwrap();
    fs::create_dir(dir.path().join("group_vars")).unwrap();
    fs::create_dir(dir.path().join("host_vars")).unwrap();
    fs::write(
        dir.path().join("group_vars").join("all.yml"),
        "ansible_user: deploy\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("group_vars").join("webservers.yml"),
        "http_port: 80\npackages:\n  - nginx\n  - certbot\n",
    )
    .unwrap();
    for h in 0..50 {
        fs::write(
            dir.path().join("host_vars").join(format!("databases_{:04}.yml", h)),
            format!("server_id: {}\n", h),
        )
        .unwrap();
    }

    group.bench_function("load_1000_hosts", |b| {
        b.iter(|| black_box(Inventory::load(black_box(dir.path()))))
    });

    group.finish();
}

fn bench_pattern_matching(c: &mut Criterion) {
    let mut group = c.benchmark_group("inventory_pattern_matching");

    let inv = Inventory::from_yaml(&generate_large_inventory_yaml(1000, 20)).unwrap();

    let patterns = vec![
        ("all", "all hosts"),
        ("group_0010", "single group"),
        ("host00*", "glob wildcard"),
        ("~host00\\d{3}", "regex pattern"),
        ("group_0001:group_0002", "union"),
        ("all:!group_0010", "exclusion"),
    ];

    for (pattern, name) in patterns {
        group.bench_function(name, |b| {
            b.iter(|| black_box(inv.get_hosts(black_box(pattern))))
        });
    }

    group.finish();
}

fn bench_host_variable_merging(c: &mut Criterion) {
    let mut group = c.benchmark_group("inventory_var_merging");

    let inv = Inventory::from_ini(&generate_large_inventory_ini(1000)).unwrap();
    let host = inv.get_host("webservers_0100").unwrap();

    group.bench_function("host_vars", |b| {
        b.iter(|| black_box(inv.host_vars(black_box(host))))
    });

    group.bench_function("host_group_hierarchy", |b| {
        b.iter(|| black_box(inv.host_group_hierarchy(black_box(host))))
    });

    group.bench_function("host_var_lookup", |b| {
        b.iter(|| black_box(inv.host_var(black_box("webservers_0100"), black_box("env"))))
    });

    group.finish();
}

fn bench_ini_writing(c: &mut Criterion) {
    let mut group = c.benchmark_group("inventory_writing");

    for num_hosts in [100, 1000].iter() {
        let inv = Inventory::from_ini(&generate_large_inventory_ini(*num_hosts)).unwrap();
        group.throughput(Throughput::Elements(*num_hosts as u64));
        group.bench_with_input(BenchmarkId::new("ini", num_hosts), &inv, |b, inv| {
            b.iter(|| black_box(to_ini_string(black_box(inv))))
        });
    }

    group.finish();
}

criterion_group!(
    inventory_benches,
    bench_inventory_parsing_scale,
    bench_directory_loading,
    bench_pattern_matching,
    bench_host_variable_merging,
    bench_ini_writing,
);

criterion_main!(inventory_benches);
