use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use slashgate::config::Config;
use slashgate::tree::{CommandTree, NodeId};
use slashgate::{Dispatcher, DriverRegistry, Request};

// Routing overhead only: the bound chains are cheap greeters, so these
// numbers are dominated by tree matching and chain bookkeeping.

const CONFIG: &str = r#"
[triggers.hello]
word = "!hello"
drivers = ["gogap-greeter"]

[triggers.web]
word = "!deploy"
commands = ["app", "web"]
drivers = ["gogap-greeter", "gogap-sensitive-filter"]

[triggers.web.gogap-sensitive-filter]
expressions = ["secret\\S*"]
"#;

fn tree_matching_benchmark(c: &mut Criterion) {
    let mut tree: CommandTree<u32> = CommandTree::new();
    for (i, path) in [
        ["app", "web", "deploy"],
        ["app", "web", "rollback"],
        ["app", "api", "deploy"],
        ["db", "primary", "migrate"],
    ]
    .iter()
    .enumerate()
    {
        tree.bind("!ops", path, vec![i as u32]).unwrap();
    }
    let tokens = ["app", "web", "rollback", "--now"];

    let mut group = c.benchmark_group("tree");
    group.throughput(Throughput::Elements(1));
    group.bench_function("match_depth_3", |b| {
        b.iter(|| tree.match_path(NodeId::ROOT, &tokens))
    });
    group.finish();
}

fn dispatch_benchmark(c: &mut Criterion) {
    let config: Config = toml::from_str(CONFIG).unwrap();
    let registry = DriverRegistry::with_builtins().unwrap();
    let dispatcher =
        Dispatcher::from_bindings_with(config.dispatcher.clone(), config.triggers.values(), &registry)
            .unwrap();
    let runtime = tokio::runtime::Runtime::new().unwrap();

    let mut group = c.benchmark_group("dispatch");
    group.throughput(Throughput::Elements(1));

    group.bench_function("root_chain", |b| {
        let req = Request::new("!hello", "!hello there", "zeal");
        b.to_async(&runtime).iter(|| dispatcher.handle(req.clone()))
    });

    group.bench_function("sub_command_chain", |b| {
        let req = Request::new("!deploy", "!deploy app web secret=1 v2", "zeal");
        b.to_async(&runtime).iter(|| dispatcher.handle(req.clone()))
    });

    group.finish();
}

criterion_group!(benches, tree_matching_benchmark, dispatch_benchmark);
criterion_main!(benches);
