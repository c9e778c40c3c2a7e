/*!
# Taxonomy Coverage Tests

Every construct the PHP lowering produces must be classified without a
taxonomy error, and the fixtures below must reach every concrete node kind.
*/

use php_modernity::php_parser::NodeKind;
use php_modernity::{Modernity, PhpParser, SyntaxNode};
use std::collections::BTreeSet;

/// Виды, которые разбор корректного кода не порождает
const NOT_LOWERED: &[NodeKind] = &[
    NodeKind::StmtHaltCompiler,
    NodeKind::StmtNop,
    NodeKind::ExprError,
];

const FIXTURES: &[(&str, &str)] = &[
    ("inline html", "<p>header</p>\n<?php echo 1;"),
    ("echo and literals", "<?php echo 'a', \"b\", 1, 1.5, 0x1F, true, FOO;"),
    ("interpolation", "<?php $name = 'x'; echo \"Hello {$name} and $name\";"),
    ("heredoc", "<?php $v = 1;\n$a = <<<EOT\nvalue $v\nEOT;\n"),
    ("nowdoc", "<?php\n$a = <<<'EOT'\nplain text\nEOT;\n"),
    (
        "magic constants",
        "<?php echo __LINE__, __FILE__, __DIR__, __FUNCTION__, __CLASS__, __TRAIT__, __METHOD__, __NAMESPACE__;",
    ),
    ("names", "<?php \\strlen('a'); new namespace\\Foo(); Bar\\baz();"),
    (
        "assignments",
        "<?php $a = 1; $b = &$a; $c = [1, 'k' => 2, ...$d]; $e = array(1, 2); $f = $c[0];",
    ),
    ("list with holes", "<?php list($a, , $b) = $c; [$e, [$f]] = $g;"),
    (
        "assign ops",
        "<?php $a += 1; $a -= 1; $a *= 1; $a /= 1; $a .= 'x'; $a %= 1; $a **= 2; \
         $a &= 1; $a |= 1; $a ^= 1; $a <<= 1; $a >>= 1; $a ??= 1;",
    ),
    (
        "arithmetic and bitwise",
        "<?php $r = $a + $b - $c * $d / $e % $f ** $g; $s = $a & $b | $c ^ $d; $t = $a << 1 >> 2; $u = $a . $b;",
    ),
    (
        "comparisons",
        "<?php $r = [$a == $b, $a != $b, $a === $b, $a !== $b, $a < $b, $a <= $b, $a > $b, $a >= $b, $a <=> $b, $a ?? $b];",
    ),
    ("logical", "<?php $r = ($a && $b) || $c; $s = $a and $b; $t = $a or $b; $u = $a xor $b;"),
    (
        "unary",
        "<?php $r = [!$a, ~$a, -$a, +$a, @$a]; $a++; $a--; ++$a; --$a;",
    ),
    (
        "casts",
        "<?php $r = [(array) $a, (bool) $a, (float) $a, (int) $a, (object) $a, (string) $a, (unset) $a];",
    ),
    (
        "language constructs",
        "<?php $r = [isset($a), empty($b), clone $c, print 1]; eval('1;'); include 'a.php'; exit(1);",
    ),
    ("shell exec", "<?php $out = `ls -la`;"),
    ("ternary", "<?php $r = $a ? $b : $c; $s = $a ?: $c;"),
    (
        "calls and fetches",
        "<?php f($a, name: 1); $o->m(); $o->p; $o?->m(); $o?->p; A::m(); A::$p; A::C; $n = new A(1);",
    ),
    ("first class callable", "<?php $f = strlen(...);"),
    ("instanceof", "<?php $r = $a instanceof A;"),
    ("throw expression", "<?php $r = $a ?? throw new Exception('x');"),
    ("anonymous class", "<?php $o = new class(1) extends A implements I { public $p; };"),
    (
        "closures",
        "<?php $f = function ($x) use ($y, &$z) { return $x; }; $g = static fn(int $x): int => $x * 2;",
    ),
    (
        "generators",
        "<?php function g() { yield; yield 1; yield 'k' => 2; yield from h(); }",
    ),
    (
        "match with default",
        "<?php $r = match ($a) { 1, 2 => 'low', 3 => 'mid', default => 'high' };",
    ),
    (
        "control flow",
        "<?php if ($a) { echo 1; } elseif ($b) { echo 2; } else { echo 3; }\n\
         while ($a) { break; }\n\
         do { continue; } while ($a);\n\
         for ($i = 0; $i < 10; $i++) { echo $i; }\n\
         foreach ($a as $k => $v) { echo $v; }",
    ),
    (
        "switch",
        "<?php switch ($a) { case 1: echo 1; break; default: echo 2; }",
    ),
    (
        "try catch finally",
        "<?php try { f(); } catch (A | B $e) { throw $e; } catch (C $c) { } finally { echo 1; }",
    ),
    ("goto and label", "<?php goto end; echo 1; end: echo 2;"),
    (
        "function scope",
        "<?php function f() { global $a, $b; static $c = 1, $d; unset($a, $b); return $c; }",
    ),
    ("constants", "<?php const A = 1, B = 2;"),
    (
        "declare",
        "<?php declare(strict_types=1);\ndeclare(ticks=1) { echo 1; }",
    ),
    ("braced namespace", "<?php namespace App\\Model { class A {} }"),
    ("unbraced namespace", "<?php namespace App; use Foo\\Bar; use Foo\\Baz as Qux; echo 1;"),
    (
        "use statements",
        "<?php use function Foo\\f; use const Foo\\C; use Foo\\{A, B as BB};",
    ),
    (
        "class",
        "<?php abstract class A extends B implements I, J {\n\
         const X = 1;\n\
         public static ?int $count = 0;\n\
         protected $name;\n\
         abstract public function a();\n\
         public function __construct(private readonly string $id) {}\n\
         public function b(int|string $v, A&B $o, ?C $c = null, ...$rest): static { return $this; }\n\
         }",
    ),
    ("interface", "<?php interface I extends J, K { public function f(): void; }"),
    (
        "trait adaptations",
        "<?php trait T { use X, Y { a as protected b; X::c insteadof Y; d as e; } }",
    ),
    (
        "enum with cases",
        "<?php enum Suit: string implements HasLabel { case Hearts = 'H'; case Spades = 'S'; const Wild = self::Spades; }",
    ),
    ("pure enum", "<?php enum Status { case Active; case Inactive; }"),
    (
        "attributes",
        "<?php #[Entity, Table(name: 'users')]\n#[Immutable]\nclass User { #[Id] public int $id; #[Pure] function f(#[SensitiveParameter] $p) {} }",
    ),
];

fn collect_kinds(node: &SyntaxNode, seen: &mut BTreeSet<NodeKind>) {
    seen.insert(node.kind());
    for child in node.child_nodes() {
        collect_kinds(child, seen);
    }
}

#[test]
fn test_every_fixture_is_classified() {
    let engine = Modernity::new().unwrap();

    for (label, code) in FIXTURES {
        if let Err(error) = engine.get_tuple_for_code(code) {
            panic!("fixture '{}' failed: {}", label, error);
        }
    }
}

#[test]
fn test_fixtures_cover_all_concrete_kinds() {
    let mut parser = PhpParser::new().unwrap();
    let mut seen = BTreeSet::new();

    for (label, code) in FIXTURES {
        let stmts = parser
            .parse(code)
            .unwrap_or_else(|error| panic!("fixture '{}' does not parse: {}", label, error));
        for stmt in &stmts {
            collect_kinds(stmt, &mut seen);
        }
    }

    let missing: Vec<&str> = NodeKind::concrete()
        .filter(|kind| !NOT_LOWERED.contains(kind))
        .filter(|kind| !seen.contains(kind))
        .map(NodeKind::name)
        .collect();

    assert!(missing.is_empty(), "kinds not reached by any fixture: {:?}", missing);
}

#[test]
fn test_lowering_never_yields_abstract_kinds() {
    let mut parser = PhpParser::new().unwrap();
    let mut seen = BTreeSet::new();

    for (_, code) in FIXTURES {
        for stmt in &parser.parse(code).unwrap() {
            collect_kinds(stmt, &mut seen);
        }
    }

    let abstract_kinds: Vec<&str> = seen
        .iter()
        .filter(|kind| kind.is_abstract())
        .map(|kind| kind.name())
        .collect();
    assert!(abstract_kinds.is_empty(), "abstract kinds in tree: {:?}", abstract_kinds);
}
