//! Golden whole-module tests: literal source in, literal IR out.
//!
//! Expected text is compared after trimming the outer whitespace only; every
//! interior byte, including tab indentation and the blank lines between
//! entities, is significant.

use rillc_gen::{generate_ir, CompileError, LowerError};

fn assert_ir(source: &str, expected: &str) {
    let actual = generate_ir(source).expect("lowering failed");
    assert_eq!(actual.trim(), expected.trim(), "\nfull IR:\n{}", actual);
}

fn lower_err(source: &str) -> LowerError {
    match generate_ir(source).expect_err("expected a lowering failure") {
        CompileError::Lower(e) => e,
        CompileError::Parse(e) => panic!("unexpected parse failure: {}", e),
    }
}

fn chain(err: &dyn std::error::Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(e) = source {
        out.push_str(": ");
        out.push_str(&e.to_string());
        source = e.source();
    }
    out
}

#[test]
fn test_puts_hello_world() {
    assert_ir(
        r#"
@unsafe.libc.puts("hello world!", (code:@int){})
"#,
        r#"
@0 = private unnamed_addr constant [13 x i8] c"hello world!\00"

define i32 @main() {
entry:
	call void @unsafe.libc.puts(i8* getelementptr ([13 x i8], [13 x i8]* @0, i32 0, i32 0), void (i32)* @main.0)
	ret i32 0
}

define void @unsafe.libc.puts(i8* %str, void (i32)* %ok) {
entry:
	%0 = call i32 @puts(i8* %str)
	call void %ok(i32 %0)
	ret void
}

declare i32 @puts(i8* %str)

define void @main.0(i32 %code) {
entry:
	ret void
}
"#,
    );
}

#[test]
fn test_int_constant_printf() {
    assert_ir(
        "x: 12\n@printf(\"%d\", x)\n",
        r#"
@0 = private unnamed_addr constant [3 x i8] c"%d\00"

define i32 @main() {
entry:
	call void @"printf$JWQ="(i8* getelementptr ([3 x i8], [3 x i8]* @0, i32 0, i32 0), i32 12)
	ret i32 0
}

define void @"printf$JWQ="(i8* %fmt, i32 %p0) {
entry:
	%0 = call i32 (i8*, ...) @printf(i8* %fmt, i32 %p0)
	ret void
}

declare i32 @printf(i8* %fmt, ...)
"#,
    );
}

#[test]
fn test_partial_application_wrapper() {
    assert_ir(
        r#"
foo: (n:@str, s:@str){
	@printf("%s %s", s, n)
}
bar: foo("42")
bar("Alice")
"#,
        r#"
@0 = private unnamed_addr constant [6 x i8] c"%s %s\00"
@1 = private unnamed_addr constant [3 x i8] c"42\00"
@2 = private unnamed_addr constant [6 x i8] c"Alice\00"

define i32 @main() {
entry:
	call void @main.bar(i8* getelementptr ([6 x i8], [6 x i8]* @2, i32 0, i32 0))
	ret i32 0
}

define void @main.foo(i8* %n, i8* %s) {
entry:
	call void @"printf$JXMlcw=="(i8* getelementptr ([6 x i8], [6 x i8]* @0, i32 0, i32 0), i8* %s, i8* %n)
	ret void
}

define void @"printf$JXMlcw=="(i8* %fmt, i8* %p0, i8* %p1) {
entry:
	%0 = call i32 (i8*, ...) @printf(i8* %fmt, i8* %p0, i8* %p1)
	ret void
}

declare i32 @printf(i8* %fmt, ...)

define void @main.bar(i8* %s) {
entry:
	call void @main.foo(i8* getelementptr ([3 x i8], [3 x i8]* @1, i32 0, i32 0), i8* %s)
	ret void
}
"#,
    );
}

#[test]
fn test_capture_promotion_through_callback() {
    assert_ir(
        r#"
foo: (input: @str){
    @unsafe.libc.puts(input, (code:@int){})
}
bar: (cb:(@str)) {
    cb("hello world")
}
bar(foo)
"#,
        r#"
@0 = global ptr null
@1 = private unnamed_addr constant [12 x i8] c"hello world\00"

define i32 @main() {
entry:
	call void @main.bar(void (i8*)* @main.foo)
	ret i32 0
}

define void @main.foo(i8* %input) {
entry:
	store i8* %input, ptr @0
	call void @unsafe.libc.puts(i8* %input, void (i32)* @main.foo.0)
	ret void
}

define void @unsafe.libc.puts(i8* %str, void (i32)* %ok) {
entry:
	%0 = call i32 @puts(i8* %str)
	call void %ok(i32 %0)
	ret void
}

declare i32 @puts(i8* %str)

define void @main.foo.0(i32 %code) {
entry:
	%input = load i8*, ptr @0
	ret void
}

define void @main.bar(void (i8*)* %cb) {
entry:
	call void %cb(i8* getelementptr ([12 x i8], [12 x i8]* @1, i32 0, i32 0))
	ret void
}
"#,
    );
}

#[test]
fn test_igt_compare_and_branch() {
    assert_ir(
        r#"
@igt(2, 3, (){
    @printf("More\n")
}, (){
    @printf("Less\n")
})
"#,
        r#"
@0 = private unnamed_addr constant [6 x i8] c"More\0A\00"
@1 = private unnamed_addr constant [6 x i8] c"Less\0A\00"

define i32 @main() {
entry:
	call void @builtin.igt(i32 2, i32 3, void ()* @main.0, void ()* @main.1)
	ret i32 0
}

define void @builtin.igt(i32 %x, i32 %y, void ()* %true, void ()* %false) {
entry:
	%0 = icmp sgt i32 %x, %y
	br i1 %0, label %iftrue, label %iffalse

iftrue:
	call void %true()
	ret void

iffalse:
	call void %false()
	ret void
}

define void @main.0() {
entry:
	call void @printf$(i8* getelementptr ([6 x i8], [6 x i8]* @0, i32 0, i32 0))
	ret void
}

define void @printf$(i8* %fmt) {
entry:
	%0 = call i32 (i8*, ...) @printf(i8* %fmt)
	ret void
}

declare i32 @printf(i8* %fmt, ...)

define void @main.1() {
entry:
	call void @printf$(i8* getelementptr ([6 x i8], [6 x i8]* @1, i32 0, i32 0))
	ret void
}
"#,
    );
}

#[test]
fn test_prompt_specialization() {
    assert_ir(
        r#"
@printf("What is your name?\n")
@prompt(10, (name: @str){
    @printf("Hello, %s!\n", name)
})
"#,
        r#"
@0 = private unnamed_addr constant [20 x i8] c"What is your name?\0A\00"
@builtin.prompt$10.format = private unnamed_addr constant [5 x i8] c"%10s\00"
@1 = private unnamed_addr constant [12 x i8] c"Hello, %s!\0A\00"

define i32 @main() {
entry:
	call void @printf$(i8* getelementptr ([20 x i8], [20 x i8]* @0, i32 0, i32 0))
	call void @builtin.prompt$10(i32 10, void (i8*)* @main.0)
	ret i32 0
}

define void @printf$(i8* %fmt) {
entry:
	%0 = call i32 (i8*, ...) @printf(i8* %fmt)
	ret void
}

declare i32 @printf(i8* %fmt, ...)

declare i32 @__isoc99_scanf(i8* %fmt, ...)

define void @builtin.prompt$10(i32 %limit, void (i8*)* %ok) {
entry:
	%0 = alloca [11 x i8]
	%1 = getelementptr [11 x i8], [11 x i8]* %0, i32 0, i32 0
	%2 = call i32 (i8*, ...) @__isoc99_scanf(i8* getelementptr ([5 x i8], [5 x i8]* @builtin.prompt$10.format, i32 0, i32 0), i8* %1)
	call void %ok(i8* %1)
	ret void
}

define void @main.0(i8* %name) {
entry:
	call void @"printf$JXM="(i8* getelementptr ([12 x i8], [12 x i8]* @1, i32 0, i32 0), i8* %name)
	ret void
}

define void @"printf$JXM="(i8* %fmt, i8* %p0) {
entry:
	%0 = call i32 (i8*, ...) @printf(i8* %fmt, i8* %p0)
	ret void
}
"#,
    );
}

#[test]
fn test_nested_prompt_capture_chain() {
    assert_ir(
        r#"
@printf("What is your name?\n")
@prompt(50, (name: @str){
    @printf("What is your age?\n")
    @prompt(3, (age: @str){
        @printf("Hello, %s!\n", name)
    })
})
"#,
        r#"
@0 = private unnamed_addr constant [20 x i8] c"What is your name?\0A\00"
@builtin.prompt$50.format = private unnamed_addr constant [5 x i8] c"%50s\00"
@1 = private unnamed_addr constant [19 x i8] c"What is your age?\0A\00"
@builtin.prompt$3.format = private unnamed_addr constant [4 x i8] c"%3s\00"
@2 = global ptr null
@3 = private unnamed_addr constant [12 x i8] c"Hello, %s!\0A\00"

define i32 @main() {
entry:
	call void @printf$(i8* getelementptr ([20 x i8], [20 x i8]* @0, i32 0, i32 0))
	call void @builtin.prompt$50(i32 50, void (i8*)* @main.0)
	ret i32 0
}

define void @printf$(i8* %fmt) {
entry:
	%0 = call i32 (i8*, ...) @printf(i8* %fmt)
	ret void
}

declare i32 @printf(i8* %fmt, ...)

declare i32 @__isoc99_scanf(i8* %fmt, ...)

define void @builtin.prompt$50(i32 %limit, void (i8*)* %ok) {
entry:
	%0 = alloca [51 x i8]
	%1 = getelementptr [51 x i8], [51 x i8]* %0, i32 0, i32 0
	%2 = call i32 (i8*, ...) @__isoc99_scanf(i8* getelementptr ([5 x i8], [5 x i8]* @builtin.prompt$50.format, i32 0, i32 0), i8* %1)
	call void %ok(i8* %1)
	ret void
}

define void @main.0(i8* %name) {
entry:
	call void @printf$(i8* getelementptr ([19 x i8], [19 x i8]* @1, i32 0, i32 0))
	store i8* %name, ptr @2
	call void @builtin.prompt$3(i32 3, void (i8*)* @main.0.0)
	ret void
}

define void @builtin.prompt$3(i32 %limit, void (i8*)* %ok) {
entry:
	%0 = alloca [4 x i8]
	%1 = getelementptr [4 x i8], [4 x i8]* %0, i32 0, i32 0
	%2 = call i32 (i8*, ...) @__isoc99_scanf(i8* getelementptr ([4 x i8], [4 x i8]* @builtin.prompt$3.format, i32 0, i32 0), i8* %1)
	call void %ok(i8* %1)
	ret void
}

define void @main.0.0(i8* %age) {
entry:
	%name = load i8*, ptr @2
	call void @"printf$JXM="(i8* getelementptr ([12 x i8], [12 x i8]* @3, i32 0, i32 0), i8* %name)
	ret void
}

define void @"printf$JXM="(i8* %fmt, i8* %p0) {
entry:
	%0 = call i32 (i8*, ...) @printf(i8* %fmt, i8* %p0)
	ret void
}
"#,
    );
}

#[test]
fn test_std_aliases_and_two_level_capture() {
    assert_ir(
        r#"
@std
foo: (x:string){
	ok: (s: string){
		@unsafe.libc.puts(s, (code:@int){})
	}
	ok(x)
	ok(x)
}
foo("hello world")
"#,
        r#"
@0 = global ptr null
@1 = global ptr null
@2 = private unnamed_addr constant [12 x i8] c"hello world\00"

define i32 @main() {
entry:
	call void @std()
	call void @main.foo(i8* getelementptr ([12 x i8], [12 x i8]* @2, i32 0, i32 0))
	ret i32 0
}

define void @std() {
entry:
	ret void
}

define void @main.foo(i8* %x) {
entry:
	store i8* %x, ptr @0
	call void @main.foo.ok(i8* %x)
	call void @main.foo.ok(i8* %x)
	ret void
}

define void @main.foo.ok(i8* %s) {
entry:
	%x = load i8*, ptr @0
	store i8* %s, ptr @1
	call void @unsafe.libc.puts(i8* %s, void (i32)* @main.foo.ok.0)
	ret void
}

define void @unsafe.libc.puts(i8* %str, void (i32)* %ok) {
entry:
	%0 = call i32 @puts(i8* %str)
	call void %ok(i32 %0)
	ret void
}

declare i32 @puts(i8* %str)

define void @main.foo.ok.0(i32 %code) {
entry:
	%x = load i8*, ptr @0
	%s = load i8*, ptr @1
	ret void
}
"#,
    );
}

#[test]
fn test_full_and_partial_curry() {
    assert_ir(
        r#"
foo: (n:@str, s:@str){
	@printf("The winning number for %s is %s\n", s, n)
}
bar: foo("42")
baz: foo("43", "Bob")
bar("Alice")
baz()
"#,
        r#"
@0 = private unnamed_addr constant [33 x i8] c"The winning number for %s is %s\0A\00"
@1 = private unnamed_addr constant [3 x i8] c"42\00"
@2 = private unnamed_addr constant [3 x i8] c"43\00"
@3 = private unnamed_addr constant [4 x i8] c"Bob\00"
@4 = private unnamed_addr constant [6 x i8] c"Alice\00"

define i32 @main() {
entry:
	call void @main.bar(i8* getelementptr ([6 x i8], [6 x i8]* @4, i32 0, i32 0))
	call void @main.baz()
	ret i32 0
}

define void @main.foo(i8* %n, i8* %s) {
entry:
	call void @"printf$JXMlcw=="(i8* getelementptr ([33 x i8], [33 x i8]* @0, i32 0, i32 0), i8* %s, i8* %n)
	ret void
}

define void @"printf$JXMlcw=="(i8* %fmt, i8* %p0, i8* %p1) {
entry:
	%0 = call i32 (i8*, ...) @printf(i8* %fmt, i8* %p0, i8* %p1)
	ret void
}

declare i32 @printf(i8* %fmt, ...)

define void @main.bar(i8* %s) {
entry:
	call void @main.foo(i8* getelementptr ([3 x i8], [3 x i8]* @1, i32 0, i32 0), i8* %s)
	ret void
}

define void @main.baz() {
entry:
	call void @main.foo(i8* getelementptr ([3 x i8], [3 x i8]* @2, i32 0, i32 0), i8* getelementptr ([4 x i8], [4 x i8]* @3, i32 0, i32 0))
	ret void
}
"#,
    );
}

#[test]
fn test_applied_callback_argument() {
    assert_ir(
        r#"
bar: (a:@str, b:@str, c:@str) {
    @printf("a: %s, b: %s, c: %s\n", a, b, c)
}
foo: (cb:(@str)){
    cb("c")
}
foo(bar("a", "b"))
"#,
        r#"
@0 = private unnamed_addr constant [21 x i8] c"a: %s, b: %s, c: %s\0A\00"
@1 = private unnamed_addr constant [2 x i8] c"c\00"
@2 = private unnamed_addr constant [2 x i8] c"a\00"
@3 = private unnamed_addr constant [2 x i8] c"b\00"

define i32 @main() {
entry:
	call void @main.foo(void (i8*)* @main.0)
	ret i32 0
}

define void @main.bar(i8* %a, i8* %b, i8* %c) {
entry:
	call void @printf$JXMlcyVz(i8* getelementptr ([21 x i8], [21 x i8]* @0, i32 0, i32 0), i8* %a, i8* %b, i8* %c)
	ret void
}

define void @printf$JXMlcyVz(i8* %fmt, i8* %p0, i8* %p1, i8* %p2) {
entry:
	%0 = call i32 (i8*, ...) @printf(i8* %fmt, i8* %p0, i8* %p1, i8* %p2)
	ret void
}

declare i32 @printf(i8* %fmt, ...)

define void @main.foo(void (i8*)* %cb) {
entry:
	call void %cb(i8* getelementptr ([2 x i8], [2 x i8]* @1, i32 0, i32 0))
	ret void
}

define void @main.0(i8* %c) {
entry:
	call void @main.bar(i8* getelementptr ([2 x i8], [2 x i8]* @2, i32 0, i32 0), i8* getelementptr ([2 x i8], [2 x i8]* @3, i32 0, i32 0), i8* %c)
	ret void
}
"#,
    );
}

#[test]
fn test_labeled_literal_applied_on_the_spot() {
    assert_ir(
        r#"
foo: (msg: @str){
    @unsafe.libc.puts(msg, (code:@int){})
}("hi")
foo()
"#,
        r#"
@0 = global ptr null
@1 = private unnamed_addr constant [3 x i8] c"hi\00"

define i32 @main() {
entry:
	call void @main.foo()
	ret i32 0
}

define void @main.0(i8* %msg) {
entry:
	store i8* %msg, ptr @0
	call void @unsafe.libc.puts(i8* %msg, void (i32)* @main.0.0)
	ret void
}

define void @unsafe.libc.puts(i8* %str, void (i32)* %ok) {
entry:
	%0 = call i32 @puts(i8* %str)
	call void %ok(i32 %0)
	ret void
}

declare i32 @puts(i8* %str)

define void @main.0.0(i32 %code) {
entry:
	%msg = load i8*, ptr @0
	ret void
}

define void @main.foo() {
entry:
	call void @main.0(i8* getelementptr ([3 x i8], [3 x i8]* @1, i32 0, i32 0))
	ret void
}
"#,
    );
}

#[test]
fn test_atoi_wrapper() {
    assert_ir(
        r#"
@unsafe.libc.atoi("123", (x: @int){
    @printf("result: %d\n", x)
})
"#,
        r#"
@0 = private unnamed_addr constant [4 x i8] c"123\00"
@1 = private unnamed_addr constant [12 x i8] c"result: %d\0A\00"

define i32 @main() {
entry:
	call void @unsafe.libc.atoi(i8* getelementptr ([4 x i8], [4 x i8]* @0, i32 0, i32 0), void (i32)* @main.0)
	ret i32 0
}

define void @unsafe.libc.atoi(i8* %in, void (i32)* %ok) {
entry:
	%0 = call i32 @atoi(i8* %in)
	call void %ok(i32 %0)
	ret void
}

declare i32 @atoi(i8* %in)

define void @main.0(i32 %x) {
entry:
	call void @"printf$JWQ="(i8* getelementptr ([12 x i8], [12 x i8]* @1, i32 0, i32 0), i32 %x)
	ret void
}

define void @"printf$JWQ="(i8* %fmt, i32 %p0) {
entry:
	%0 = call i32 (i8*, ...) @printf(i8* %fmt, i32 %p0)
	ret void
}

declare i32 @printf(i8* %fmt, ...)
"#,
    );
}

#[test]
fn test_partially_applied_builtin() {
    assert_ir(
        r#"
mymul: @mul(3, 3)
mymul((x: @int){
    @printf("x: %d\n", x)
})
"#,
        r#"
@0 = private unnamed_addr constant [7 x i8] c"x: %d\0A\00"

define i32 @main() {
entry:
	call void @main.mymul(void (i32)* @main.0)
	ret i32 0
}

define void @builtin.mul(i32 %x, i32 %y, void (i32)* %ok) {
entry:
	%0 = mul i32 %x, %y
	call void %ok(i32 %0)
	ret void
}

define void @main.mymul(void (i32)* %ok) {
entry:
	call void @builtin.mul(i32 3, i32 3, void (i32)* %ok)
	ret void
}

define void @main.0(i32 %x) {
entry:
	call void @"printf$JWQ="(i8* getelementptr ([7 x i8], [7 x i8]* @0, i32 0, i32 0), i32 %x)
	ret void
}

define void @"printf$JWQ="(i8* %fmt, i32 %p0) {
entry:
	%0 = call i32 (i8*, ...) @printf(i8* %fmt, i32 %p0)
	ret void
}

declare i32 @printf(i8* %fmt, ...)
"#,
    );
}

#[test]
fn test_add_callback() {
    assert_ir(
        r#"
@add(3, 3, (x: @int){
    @printf("x: %d\n", x)
})
"#,
        r#"
@0 = private unnamed_addr constant [7 x i8] c"x: %d\0A\00"

define i32 @main() {
entry:
	call void @builtin.add(i32 3, i32 3, void (i32)* @main.0)
	ret i32 0
}

define void @builtin.add(i32 %x, i32 %y, void (i32)* %ok) {
entry:
	%0 = add i32 %x, %y
	call void %ok(i32 %0)
	ret void
}

define void @main.0(i32 %x) {
entry:
	call void @"printf$JWQ="(i8* getelementptr ([7 x i8], [7 x i8]* @0, i32 0, i32 0), i32 %x)
	ret void
}

define void @"printf$JWQ="(i8* %fmt, i32 %p0) {
entry:
	%0 = call i32 (i8*, ...) @printf(i8* %fmt, i32 %p0)
	ret void
}

declare i32 @printf(i8* %fmt, ...)
"#,
    );
}

#[test]
fn test_anonymous_functions_called_on_the_spot() {
    let expected = r#"
@0 = private unnamed_addr constant [4 x i8] c"Hi\0A\00"

define i32 @main() {
entry:
	call void @main.0()
	ret i32 0
}

define void @main.0() {
entry:
	call void @printf$(i8* getelementptr ([4 x i8], [4 x i8]* @0, i32 0, i32 0))
	ret void
}

define void @printf$(i8* %fmt) {
entry:
	%0 = call i32 (i8*, ...) @printf(i8* %fmt)
	ret void
}

declare i32 @printf(i8* %fmt, ...)
"#;
    assert_ir("(){\n    @printf(\"Hi\\n\")\n}\n", expected);
    assert_ir("{\n    @printf(\"Hi\\n\")\n}\n", expected);
}

#[test]
fn test_named_string_constant() {
    assert_ir(
        r#"
msg: "hello world"
foo: (s:@str){
    @unsafe.libc.puts(s, (code:@int){})
}
foo(msg)
"#,
        r#"
@msg = private unnamed_addr constant [12 x i8] c"hello world\00"
@0 = global ptr null

define i32 @main() {
entry:
	call void @main.foo(i8* getelementptr ([12 x i8], [12 x i8]* @msg, i32 0, i32 0))
	ret i32 0
}

define void @main.foo(i8* %s) {
entry:
	store i8* %s, ptr @0
	call void @unsafe.libc.puts(i8* %s, void (i32)* @main.foo.0)
	ret void
}

define void @unsafe.libc.puts(i8* %str, void (i32)* %ok) {
entry:
	%0 = call i32 @puts(i8* %str)
	call void %ok(i32 %0)
	ret void
}

declare i32 @puts(i8* %str)

define void @main.foo.0(i32 %code) {
entry:
	%s = load i8*, ptr @0
	ret void
}
"#,
    );
}

#[test]
fn test_callback_type_parameters_and_applied_compare() {
    assert_ir(
        r#"
if: (cond: ((),()), ok:()){
    cond(ok, {})
}
if(@igt(4, 3), {
    @printf("More\n")
})
"#,
        r#"
@0 = global ptr null
@1 = global ptr null
@2 = private unnamed_addr constant [6 x i8] c"More\0A\00"

define i32 @main() {
entry:
	call void @main.if(void (void ()*, void ()*)* @main.0, void ()* @main.1)
	ret i32 0
}

define void @main.if(void (void ()*, void ()*)* %cond, void ()* %ok) {
entry:
	store void (void ()*, void ()*)* %cond, ptr @0
	store void ()* %ok, ptr @1
	call void %cond(void ()* %ok, void ()* @main.if.0)
	ret void
}

define void @main.if.0() {
entry:
	%cond = load void (void ()*, void ()*)*, ptr @0
	%ok = load void ()*, ptr @1
	ret void
}

define void @builtin.igt(i32 %x, i32 %y, void ()* %true, void ()* %false) {
entry:
	%0 = icmp sgt i32 %x, %y
	br i1 %0, label %iftrue, label %iffalse

iftrue:
	call void %true()
	ret void

iffalse:
	call void %false()
	ret void
}

define void @main.0(void ()* %true, void ()* %false) {
entry:
	call void @builtin.igt(i32 4, i32 3, void ()* %true, void ()* %false)
	ret void
}

define void @main.1() {
entry:
	call void @printf$(i8* getelementptr ([6 x i8], [6 x i8]* @2, i32 0, i32 0))
	ret void
}

define void @printf$(i8* %fmt) {
entry:
	%0 = call i32 (i8*, ...) @printf(i8* %fmt)
	ret void
}

declare i32 @printf(i8* %fmt, ...)
"#,
    );
}

#[test]
fn test_ieq_uses_equality_predicate() {
    let ir = generate_ir("@ieq(1, 2, (){\n}, (){\n})\n").unwrap();
    assert!(ir.contains("define void @builtin.ieq(i32 %x, i32 %y, void ()* %true, void ()* %false)"));
    assert!(ir.contains("%0 = icmp eq i32 %x, %y"));
}

#[test]
fn test_printf_specializations_do_not_collide() {
    let ir = generate_ir("@printf(\"%d\", 1)\n@printf(\"%s\", \"x\")\n").unwrap();
    assert!(ir.contains("@\"printf$JWQ=\"(i8* %fmt, i32 %p0)"));
    assert!(ir.contains("@\"printf$JXM=\"(i8* %fmt, i8* %p0)"));
    // One libc declaration serves both specializations.
    assert_eq!(ir.matches("declare i32 @printf").count(), 1);
}

#[test]
fn test_idempotent_lowering() {
    let source = r#"
@printf("What is your name?\n")
@prompt(10, (name: @str){
    @printf("Hello, %s!\n", name)
})
"#;
    let first = generate_ir(source).unwrap();
    let second = generate_ir(source).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_printf_requires_literal_format() {
    let err = lower_err("x: \"%d\"\n@printf(x, 1)\n");
    let rendered = chain(&err);
    assert!(
        rendered.contains("compile-time string literal"),
        "got: {}",
        rendered
    );
}

#[test]
fn test_printf_rejects_unsupported_specifier() {
    let err = lower_err("@printf(\"%f\", 1)\n");
    let rendered = chain(&err);
    assert!(rendered.contains("specializing builtin \"@printf\""), "got: {}", rendered);
    assert!(rendered.contains("\"%f\" is not supported"), "got: {}", rendered);
}

#[test]
fn test_prompt_requires_integer_limit() {
    let err = lower_err("@prompt(\"ten\", (s: @str){\n})\n");
    let rendered = chain(&err);
    assert!(
        rendered.contains("@prompt limit must be a compile-time integer literal"),
        "got: {}",
        rendered
    );
}

#[test]
fn test_unknown_builtin_is_unknown_name() {
    let err = lower_err("@nosuch(1)\n");
    assert!(matches!(err, LowerError::UnknownName { .. }));
}

#[test]
fn test_duplicate_string_labels_in_sibling_scopes() {
    let ir = generate_ir(
        "foo: {\n    msg: \"a\"\n    @unsafe.libc.puts(msg, (code:@int){})\n}\nbar: {\n    msg: \"b\"\n    @unsafe.libc.puts(msg, (code:@int){})\n}\nfoo()\nbar()\n",
    )
    .unwrap();
    assert!(ir.contains("@msg = private unnamed_addr constant [2 x i8] c\"a\\00\""));
    // The second `msg` falls back to a numbered global.
    assert!(ir.contains("@0 = private unnamed_addr constant [2 x i8] c\"b\\00\""));
}
