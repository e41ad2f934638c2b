use std::{cell::RefCell, io, path::PathBuf, rc::Rc};

use foxdream::{
	Config, EXIT_SOFTWARE, EXIT_SYNTAX, FoxDream, FoxError, MemoryDriver, MemoryResolver, ParseErrorType,
	RuntimeErrorType, Value,
};
use indoc::indoc;

/// `print` sink shared with the test.
#[derive(Clone, Default)]
struct Output(Rc<RefCell<Vec<u8>>>);

impl io::Write for Output {
	fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
		self.0.borrow_mut().extend_from_slice(buf);
		Ok(buf.len())
	}

	fn flush(&mut self) -> io::Result<()> { Ok(()) }
}

impl Output {
	fn text(&self) -> String { String::from_utf8(self.0.borrow().clone()).unwrap() }
}

fn session(config: Config) -> (FoxDream, Output) {
	let output = Output::default();
	(FoxDream::new(config).with_output(output.clone()), output)
}

fn run(source: &str) -> String {
	let (mut foxdream, output) = session(Config::default());
	if let Err(e) = foxdream.run(source) {
		panic!("{e}\nsource:\n{source}");
	}
	output.text()
}

fn runtime_error(source: &str) -> RuntimeErrorType {
	let (mut foxdream, _) = session(Config::default());
	match foxdream.run(source) {
		Err(FoxError::RuntimeError(e)) => e.r#type,
		other => panic!("expected a runtime error, got {other:?}"),
	}
}

fn scripts() -> PathBuf { PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("scripts") }

#[test]
fn defers_run_in_reverse_after_return() {
	let output = run(indoc! {r#"
		function work()
			defer
				? "first"
			enddefer
			defer
				? "second"
			enddefer
			? "body"
			return 1
		endfunc

		? work()
	"#});
	assert_eq!(output, "body\nsecond\nfirst\n1\n");
}

#[test]
fn closures_keep_their_scope() {
	let output = run(indoc! {"
		function make_counter()
			local count = 0
			function next_value()
				count += 1
				return count
			endfunc
			return next_value
		endfunc

		local first = make_counter()
		local second = make_counter()
		first()
		? first(), second()
	"});
	assert_eq!(output, "2\n1\n");
}

#[test]
fn closures_observe_later_updates() {
	let output = run(indoc! {"
		local base = 1
		function read()
			return base
		endfunc
		base = 42
		? read()
	"});
	assert_eq!(output, "42\n");
}

#[test]
fn blank_lines_do_not_matter() {
	assert_eq!(run("x = 1;\n\n\n? x"), run("x = 1\n? x"));
}

#[test]
fn named_and_omitted_arguments() {
	let output = run(indoc! {r#"
		function greet(name as who, greeting = "Hello")
			return greeting + ", " + name
		endfunc

		? greet(who: "Ada", greeting: "Hi")
		? greet("Bob", _)
		? greet(_, "Yo")
	"#});
	assert_eq!(output, "Hi, Ada\nHello, Bob\nYo, null\n");

	let declaration = "function pair(a, b)\nreturn a\nendfunc\n";
	assert_eq!(
		runtime_error(&format!("{declaration}pair(1)")),
		RuntimeErrorType::ArityMismatch { expected: 2, got: 1 }
	);
	assert_eq!(
		runtime_error(&format!("{declaration}pair(a: 1, c: 2)")),
		RuntimeErrorType::UnknownArgument("c".to_string())
	);
}

#[test]
fn arrays_and_createobject() {
	let output = run(indoc! {r#"
		local list = createobject("array", 1, 2)
		list.add(3)
		? list.len(), list.contains(2), list.indexOf(5)
		? list.set(0, "a"), list
		list[2] = 30
		? list[1], list
		local same = createobject("array")
		? same.len()
	"#});
	assert_eq!(output, "3\ntrue\n-1\n1\n[a, 2, 3]\n2\n[a, 2, 30]\n3\n");

	assert_eq!(runtime_error("local a = createobject(\"array\")\n? a[3]"), RuntimeErrorType::IndexOutOfBounds {
		index: 3.0,
		len:   0,
	});
	assert_eq!(runtime_error("array.shuffle()"), RuntimeErrorType::UnknownMethod);
}

#[test]
fn multiple_return_values_destructure() {
	let output = run(indoc! {"
		function divide(a, b)
			return int(a, b), a - b
		endfunc
		function int(a, b)
			return a / b
		endfunc

		local (q, r) = divide(10, 4)
		? q, r
		(q, _) = 1, 2
		? q
	"});
	assert_eq!(output, "2.5\n6\n1\n");
	assert_eq!(runtime_error("(a, b, c) = 1, 2"), RuntimeErrorType::WrongNumberOfValues { expected: 3, got: 2 });
	assert_eq!(runtime_error("(a) = 1, 2"), RuntimeErrorType::WrongNumberOfVariables { expected: 1, got: 2 });
}

#[test]
fn modules_are_constant_scopes() {
	let output = run(indoc! {r#"
		module config
			name = "fox"
		endmodule

		? config.name
		config.name = "dream"
		config["level"] = 3
		? config
	"#});
	assert_eq!(output, "fox\n{level:3, name:dream}\n");
	assert_eq!(
		runtime_error("module m\nendmodule\nm = 1"),
		RuntimeErrorType::ConstantAssignment("m".to_string())
	);
}

#[test]
fn imports_resolve_through_the_resolver() {
	let resolver = MemoryResolver::default().with("geometry", indoc! {r#"
		const UNIT = "cm"
		function area(w, h)
			return w * h
		endfunc
	"#});
	let output = Output::default();
	let mut foxdream = FoxDream::new(Config::default()).with_output(output.clone()).with_resolver(resolver);
	foxdream.run("import geometry\n? geometry.area(2, 3), geometry.UNIT").unwrap();
	assert_eq!(output.text(), "6\ncm\n");
}

#[test]
fn circular_imports_are_syntax_errors() {
	let resolver = MemoryResolver::default().with("a", "import b").with("b", "import a");
	let mut foxdream = FoxDream::new(Config::default()).with_output(Output::default()).with_resolver(resolver);
	let error = foxdream.run("import a").unwrap_err();
	assert_eq!(error.exit_code(), EXIT_SYNTAX);
	let FoxError::SyntaxErrors(errors) = error else { panic!("expected syntax errors") };
	assert!(matches!(errors[0].r#type, ParseErrorType::InModule { .. }));
	assert!(errors[0].to_string().contains("Circular import of module `a`."));
}

#[test]
fn syntax_errors_suppress_the_whole_unit() {
	let (mut foxdream, output) = session(Config::default());
	let error = foxdream.run("? 1\nlocal = 2\n? (\n").unwrap_err();
	let FoxError::SyntaxErrors(ref errors) = error else { panic!("expected syntax errors, got {error:?}") };
	assert_eq!(errors.len(), 2);
	assert_eq!(error.exit_code(), EXIT_SYNTAX);
	assert_eq!(output.text(), "");
}

#[test]
fn runtime_errors_stop_execution() {
	let (mut foxdream, output) = session(Config::default());
	let error = foxdream.run("? 1\n? missing\n? 2").unwrap_err();
	assert_eq!(error.exit_code(), EXIT_SOFTWARE);
	assert_eq!(error.to_string(), "[2:3] Runtime error near of `missing`: Undefined variable `missing`.");
	assert_eq!(output.text(), "1\n");
}

#[test]
fn globals_persist_between_runs() {
	let (mut foxdream, output) = session(Config::default());
	foxdream.run("public total = 5").unwrap();
	foxdream.run("total += 1\n? total").unwrap();
	assert_eq!(output.text(), "6\n");
}

#[test]
fn step_budget_stops_endless_loops() {
	let (mut foxdream, _) = session(Config { max_steps: Some(50), ..Config::default() });
	let error = foxdream.run("do while .t.\nenddo").unwrap_err();
	let FoxError::RuntimeError(error) = error else { panic!("expected a runtime error") };
	assert_eq!(error.r#type, RuntimeErrorType::StepBudgetExceeded(50));
	assert_eq!(error.to_string(), "[1:4] Runtime error near of `while`: Execution step budget of 50 exceeded.");
}

#[test]
fn runaway_recursion_is_a_runtime_error() {
	let (mut foxdream, output) = session(Config { max_depth: 16, ..Config::default() });
	let error = foxdream.run("function f(n)\nreturn f(n + 1)\nendfunc\nf(0)").unwrap_err();
	let FoxError::RuntimeError(error) = error else { panic!("expected a runtime error") };
	assert_eq!(error.r#type, RuntimeErrorType::CallDepthExceeded(16));
	assert_eq!(error.to_string(), "[2:8] Runtime error near of `f`: Call depth limit of 16 exceeded.");

	foxdream
		.run(indoc! {"
			function down(n)
				if n == 0
					return 0
				endif
				return down(n - 1) + 1
			endfunc
			? down(15)
		"})
		.unwrap();
	assert_eq!(output.text(), "15\n");
}

#[test]
fn self_containing_values_print() {
	let output = run(indoc! {"
		local a = createobject(\"array\")
		a.add(a)
		a.add(1)
		? a
		module box
		endmodule
		box.me = box
		box.items = a
		? box
	"});
	assert_eq!(output, "[[...], 1]\n{items:[[...], 1], me:{...}}\n");
}

#[test]
fn member_access_on_plain_values_yields_the_value() {
	assert_eq!(run("local n = 5\n? n.size, \"fox\".size"), "5\nfox\n");
}

#[test]
fn release_unbinds_variables() {
	let (mut foxdream, _) = session(Config::default());
	foxdream.run("public x = 1\nfunction forget()\nrelease x\nendfunc\nforget()").unwrap();
	let FoxError::RuntimeError(error) = foxdream.run("? x").unwrap_err() else { panic!("expected a runtime error") };
	assert_eq!(error.r#type, RuntimeErrorType::UndefinedVariable("x".to_string()));
	assert_eq!(runtime_error("x = 1\nrelease x\n? x"), RuntimeErrorType::UndefinedVariable("x".to_string()));
}

#[test]
fn plus_ignores_spelled_out_infinity() {
	assert_eq!(run("? 5 + \"inf\", 5 + \" 2 \""), "5\n7\n");
}

#[test]
fn classes_are_values() {
	let output = run(indoc! {"
		class Shape
			sides = 0
			function init(n)
			endfunc
		endclass
		class Square as Shape
		endclass

		? Shape, Square
		? Shape(4)
	"});
	assert_eq!(output, "class(Shape)\nclass(Square)\nnull\n");
	assert_eq!(runtime_error("local x = 1\nclass Bad as x\nendclass"), RuntimeErrorType::SuperclassNotClass);
}

#[test]
fn connection_reads_tables_through_a_driver() {
	let driver = MemoryDriver::new().with_table("people", &["id", "name"], vec![
		vec![Value::Number(1.0), Value::String("ada".to_string())],
		vec![Value::Number(2.0), Value::String("bob".to_string())],
	]);
	let output = Output::default();
	let mut foxdream = FoxDream::new(Config::default()).with_output(output.clone()).with_driver(1, driver);
	foxdream
		.run(indoc! {r#"
			connection.provider = _MYSQL
			connection.database = "shop"
			? connection.connect()
			local rows = connection.open("people")
			do while !rows.eof()
				? rows.id + 10, rows.NAME
				rows.next()
			enddo
			rows.close()
			? connection.disconnect()
		"#})
		.unwrap();
	assert_eq!(output.text(), "true\n11\nada\n12\nbob\ntrue\n");
}

#[test]
fn connection_errors() {
	assert_eq!(
		runtime_error("connection.open(\"people\")"),
		RuntimeErrorType::Host("The connection object is not connected.".to_string())
	);
	assert_eq!(
		runtime_error("connection.provider = 9\nconnection.connect()"),
		RuntimeErrorType::Host("No driver registered for provider 9.".to_string())
	);
}

#[test]
fn builtins() {
	let output = run(indoc! {r#"
		? _VERSION, _MSSQL
		? alltrim("  fox  ") + "|", len("dream")
		local start = tick()
		? tack(start) >= 0
		? empty
	"#});
	assert_eq!(output, "1.0\n2\nfox|\n5\ntrue\n{}\n");
	assert_eq!(runtime_error("alltrim(1)"), RuntimeErrorType::ArgumentType { expected: "String", got: "Double" });
}

#[test]
fn run_script_files() {
	let (mut foxdream, output) = session(Config { import_dir: scripts(), ..Config::default() });
	foxdream.run_file(scripts().join("main.prg")).unwrap();
	assert_eq!(output.text(), "Hello, Ada!\nHello, Grace!\nfound\n");

	let output = Output::default();
	let mut foxdream = FoxDream::new(Config::default()).with_output(output.clone());
	foxdream.run_file(scripts().join("totals.prg")).unwrap();
	assert_eq!(output.text(), "120\n1\n");
}

#[test]
fn missing_script_is_an_internal_error() {
	let (mut foxdream, _) = session(Config::default());
	let error = foxdream.run_file(scripts().join("nope.prg")).unwrap_err();
	assert!(matches!(error, FoxError::InternalError(_)));
	assert_eq!(error.exit_code(), EXIT_SOFTWARE);
}
