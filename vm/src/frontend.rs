// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Lowers an `oxc_parser`/`oxc_ast` tree into this crate's own [`crate::ast`]
//! shape. This is the only module that imports `oxc` — everything downstream
//! of [`crate::ast`] is agent- and parser-agnostic, per that module's own
//! doc comment.
//!
//! `oxc_ast`'s tree borrows from a bump [`Allocator`] and is built for a
//! single parse-then-discard pass; this crate's tree is owned (`Rc`/`Box`)
//! so that function objects can share a `Rc<ast::Function>` and evaluation
//! can stay `async` without threading an arena lifetime through a stored
//! future. Lowering therefore happens once, right after parsing, driven by
//! [`Lowerer`], and the `Allocator` is dropped at the end of
//! [`parse_script`]. `Lowerer` only keeps the original source text around
//! (to slice out each function/class's `source_text`), not the allocator.
//!
//! Two grammar features `oxc_ast::ast::BindingPattern` carries that this
//! crate's [`crate::ast::BindingPattern`] cannot represent at the top
//! parameter level are dropped silently here, matching the simplification
//! already baked into `syntax_directed_operations::evaluation::bind_arguments`:
//! a function's own top-level parameter defaults and its own top-level rest
//! parameter (`function f(a = 1, ...rest) {}`). Both still work correctly
//! when nested inside a destructured parameter (`function f([a = 1]) {}`,
//! `function f({...rest}) {}`), since those go through
//! `crate::ast::BindingElement`/`ObjectBindingProp`, which do carry
//! `default`/`is_rest`. See DESIGN.md.

use std::rc::Rc;

use oxc_allocator::Allocator;
use oxc_ast::ast as oxc;
use oxc_parser::Parser;
use oxc_span::SourceType;

use crate::ast;

#[derive(Debug, thiserror::Error)]
pub enum FrontendError {
    #[error("SyntaxError: {0}")]
    Syntax(String),
    #[error("SyntaxError: unsupported syntax: {0}")]
    Unsupported(&'static str),
}

/// Parses `source_text` as a script (no module grammar) and lowers the
/// result into this crate's own [`ast::Program`].
pub fn parse_script(source_text: &str) -> Result<ast::Program, FrontendError> {
    let allocator = Allocator::default();
    let source_type = SourceType::cjs();
    let result = Parser::new(&allocator, source_text, source_type).parse();
    if !result.errors.is_empty() {
        let message = result.errors.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; ");
        return Err(FrontendError::Syntax(message));
    }
    let lowerer = Lowerer { source: source_text };
    let strict = has_use_strict_directive(&result.program.directives);
    let body = lowerer.lower_statements(&result.program.body)?;
    Ok(ast::Program { body, strict })
}

fn has_use_strict_directive(directives: &[oxc::Directive]) -> bool {
    directives.iter().any(|d| d.directive.as_str() == "use strict")
}

/// Carries the original source text so function/class nodes can capture
/// their own `source_text` slice by byte offset (`span.start`/`span.end`) as
/// they lower — the only piece of state this pass needs beyond the node
/// being visited.
struct Lowerer<'s> {
    source: &'s str,
}

impl<'s> Lowerer<'s> {
    fn span_text(&self, span: oxc_span::Span) -> Rc<str> {
        Rc::from(span.source_text(self.source))
    }

    // ==================================================================
    // Statements
    // ==================================================================

    fn lower_statements(&self, stmts: &[oxc::Statement]) -> Result<Vec<ast::Statement>, FrontendError> {
        stmts.iter().map(|s| self.lower_statement(s)).collect()
    }

    fn lower_statement(&self, stmt: &oxc::Statement) -> Result<ast::Statement, FrontendError> {
        Ok(match stmt {
            oxc::Statement::ExpressionStatement(s) => ast::Statement::Expression(self.lower_expression(&s.expression)?),
            oxc::Statement::VariableDeclaration(s) => ast::Statement::VariableDeclaration(self.lower_variable_declaration(s)?),
            oxc::Statement::FunctionDeclaration(f) => ast::Statement::FunctionDeclaration(Rc::new(self.lower_function(f, false)?)),
            oxc::Statement::ClassDeclaration(c) => ast::Statement::ClassDeclaration(Rc::new(self.lower_class(c)?)),
            oxc::Statement::BlockStatement(s) => ast::Statement::Block(self.lower_statements(&s.body)?),
            oxc::Statement::IfStatement(s) => ast::Statement::If {
                test: self.lower_expression(&s.test)?,
                consequent: Box::new(self.lower_statement(&s.consequent)?),
                alternate: s.alternate.as_ref().map(|a| self.lower_statement(a)).transpose()?.map(Box::new),
            },
            oxc::Statement::WhileStatement(s) => ast::Statement::While { test: self.lower_expression(&s.test)?, body: Box::new(self.lower_statement(&s.body)?) },
            oxc::Statement::DoWhileStatement(s) => ast::Statement::DoWhile { body: Box::new(self.lower_statement(&s.body)?), test: self.lower_expression(&s.test)? },
            oxc::Statement::ForStatement(s) => ast::Statement::For {
                init: s.init.as_ref().map(|i| self.lower_for_init(i)).transpose()?.map(Box::new),
                test: s.test.as_ref().map(|e| self.lower_expression(e)).transpose()?,
                update: s.update.as_ref().map(|e| self.lower_expression(e)).transpose()?,
                body: Box::new(self.lower_statement(&s.body)?),
            },
            oxc::Statement::ForInStatement(s) => ast::Statement::ForIn {
                left: self.lower_for_target(&s.left)?,
                right: self.lower_expression(&s.right)?,
                body: Box::new(self.lower_statement(&s.body)?),
            },
            oxc::Statement::ForOfStatement(s) => ast::Statement::ForOf {
                left: self.lower_for_target(&s.left)?,
                right: self.lower_expression(&s.right)?,
                is_await: s.r#await,
                body: Box::new(self.lower_statement(&s.body)?),
            },
            oxc::Statement::ReturnStatement(s) => ast::Statement::Return(s.argument.as_ref().map(|e| self.lower_expression(e)).transpose()?),
            oxc::Statement::BreakStatement(s) => ast::Statement::Break(s.label.as_ref().map(|l| l.name.as_str().to_string())),
            oxc::Statement::ContinueStatement(s) => ast::Statement::Continue(s.label.as_ref().map(|l| l.name.as_str().to_string())),
            oxc::Statement::ThrowStatement(s) => ast::Statement::Throw(self.lower_expression(&s.argument)?),
            oxc::Statement::TryStatement(s) => ast::Statement::Try {
                block: self.lower_statements(&s.block.body)?,
                handler: s.handler.as_ref().map(|h| self.lower_catch_clause(h)).transpose()?,
                finalizer: s.finalizer.as_ref().map(|f| self.lower_statements(&f.body)).transpose()?,
            },
            oxc::Statement::SwitchStatement(s) => ast::Statement::Switch {
                discriminant: self.lower_expression(&s.discriminant)?,
                cases: s.cases.iter().map(|c| self.lower_switch_case(c)).collect::<Result<_, _>>()?,
            },
            oxc::Statement::LabeledStatement(s) => ast::Statement::Labeled { label: s.label.name.as_str().to_string(), body: Box::new(self.lower_statement(&s.body)?) },
            oxc::Statement::EmptyStatement(_) => ast::Statement::Empty,
            oxc::Statement::DebuggerStatement(_) => ast::Statement::Empty,
            oxc::Statement::WithStatement(_) => return Err(FrontendError::Unsupported("with statements")),
            oxc::Statement::ImportDeclaration(_)
            | oxc::Statement::ExportAllDeclaration(_)
            | oxc::Statement::ExportDefaultDeclaration(_)
            | oxc::Statement::ExportNamedDeclaration(_) => return Err(FrontendError::Unsupported("modules")),
            _ => return Err(FrontendError::Unsupported("TypeScript syntax")),
        })
    }

    fn lower_for_init(&self, init: &oxc::ForStatementInit) -> Result<ast::ForInit, FrontendError> {
        match init {
            oxc::ForStatementInit::VariableDeclaration(decl) => Ok(ast::ForInit::Declaration(self.lower_variable_declaration(decl)?)),
            _ => {
                let expr = init.as_expression().expect("non-declaration ForStatementInit is always an expression variant");
                Ok(ast::ForInit::Expression(self.lower_expression(expr)?))
            }
        }
    }

    fn lower_for_target(&self, left: &oxc::ForStatementLeft) -> Result<ast::ForTarget, FrontendError> {
        match left {
            oxc::ForStatementLeft::VariableDeclaration(decl) => {
                let kind = lower_var_kind(decl.kind);
                let (pattern, _) = decl.declarations.first().expect("for-in/for-of declarations have exactly one binding");
                Ok(ast::ForTarget::Declaration(kind, self.lower_binding_pattern(pattern)?))
            }
            _ => {
                let target = left.as_assignment_target().expect("non-declaration ForStatementLeft is always an assignment target");
                Ok(ast::ForTarget::Pattern(self.assignment_target_as_binding_pattern(target)?))
            }
        }
    }

    fn lower_catch_clause(&self, handler: &oxc::CatchClause) -> Result<ast::CatchClause, FrontendError> {
        Ok(ast::CatchClause {
            param: handler.param.as_ref().map(|p| self.lower_binding_pattern(&p.pattern)).transpose()?,
            body: self.lower_statements(&handler.body.body)?,
        })
    }

    fn lower_switch_case(&self, case: &oxc::SwitchCase) -> Result<ast::SwitchCase, FrontendError> {
        Ok(ast::SwitchCase { test: case.test.as_ref().map(|e| self.lower_expression(e)).transpose()?, body: self.lower_statements(&case.consequent)? })
    }

    fn lower_variable_declaration(&self, decl: &oxc::VariableDeclaration) -> Result<ast::VariableDeclaration, FrontendError> {
        let kind = lower_var_kind(decl.kind);
        let declarations = decl
            .declarations
            .iter()
            .map(|d| Ok((self.lower_binding_pattern(&d.id)?, d.init.as_ref().map(|e| self.lower_expression(e)).transpose()?)))
            .collect::<Result<_, FrontendError>>()?;
        Ok(ast::VariableDeclaration { kind, declarations })
    }

    // ==================================================================
    // Binding patterns
    // ==================================================================

    fn lower_binding_pattern(&self, pattern: &oxc::BindingPattern) -> Result<ast::BindingPattern, FrontendError> {
        match &pattern.kind {
            oxc::BindingPatternKind::BindingIdentifier(id) => Ok(ast::BindingPattern::Identifier(id.name.as_str().to_string())),
            oxc::BindingPatternKind::ObjectPattern(object) => {
                let props = object
                    .properties
                    .iter()
                    .map(|prop| {
                        let key = self.lower_property_key(&prop.key)?;
                        let (value, default) = self.split_default(&prop.value)?;
                        Ok(ast::ObjectBindingProp { key, value, default, is_rest: false })
                    })
                    .collect::<Result<_, FrontendError>>()?;
                let rest = object.rest.as_ref().map(|r| simple_rest_name(&r.argument)).transpose()?;
                Ok(ast::BindingPattern::Object(props, rest))
            }
            oxc::BindingPatternKind::ArrayPattern(array) => {
                let mut elements = Vec::with_capacity(array.elements.len());
                for element in &array.elements {
                    elements.push(match element {
                        None => None,
                        Some(pattern) => {
                            let (inner, default) = self.split_default(pattern)?;
                            Some(ast::BindingElement { pattern: inner, default, is_rest: false })
                        }
                    });
                }
                if let Some(rest) = &array.rest {
                    elements.push(Some(ast::BindingElement { pattern: self.lower_binding_pattern(&rest.argument)?, default: None, is_rest: true }));
                }
                Ok(ast::BindingPattern::Array(elements))
            }
            // A top-level `AssignmentPattern` only occurs for a function
            // parameter default (`function f(a = 1)`) — see the module doc
            // comment. The default is dropped; the underlying pattern is kept.
            oxc::BindingPatternKind::AssignmentPattern(assignment) => self.lower_binding_pattern(&assignment.left),
        }
    }

    /// Splits a (possibly-defaulted) nested binding pattern into its real
    /// pattern and default-value expression, for array-element and
    /// object-property positions where `oxc` folds the default into an
    /// `AssignmentPattern` wrapper rather than a sibling field.
    fn split_default(&self, pattern: &oxc::BindingPattern) -> Result<(ast::BindingPattern, Option<ast::Expression>), FrontendError> {
        match &pattern.kind {
            oxc::BindingPatternKind::AssignmentPattern(assignment) => {
                Ok((self.lower_binding_pattern(&assignment.left)?, Some(self.lower_expression(&assignment.right)?)))
            }
            _ => Ok((self.lower_binding_pattern(pattern)?, None)),
        }
    }

    fn lower_property_key(&self, key: &oxc::PropertyKey) -> Result<ast::PropertyKeyExpr, FrontendError> {
        match key {
            oxc::PropertyKey::StaticIdentifier(id) => Ok(ast::PropertyKeyExpr::Identifier(id.name.as_str().to_string())),
            oxc::PropertyKey::PrivateIdentifier(id) => Ok(ast::PropertyKeyExpr::PrivateName(id.name.as_str().to_string())),
            _ => {
                // A bare string/numeric literal key (`{"foo": 1}`, `{42: 1}`)
                // also lands here, alongside a genuinely computed key; both
                // evaluate the same way through `property_key_from_expr`.
                let expr = key.as_expression().expect("non-identifier PropertyKey is always an expression variant");
                Ok(ast::PropertyKeyExpr::Computed(Box::new(self.lower_expression(expr)?)))
            }
        }
    }

    /// Turns a left-hand-side `AssignmentTarget` (the `for (x of xs)` / bare
    /// `for ([a, b] of xs)` position) into a `BindingPattern`, reusing the
    /// same lowering as a declared binding — assignment targets here can't
    /// carry defaults (`for ([a = 1] of xs)` is not valid grammar for a
    /// non-declaring for-of left side), so there's no default-splitting to
    /// do.
    fn assignment_target_as_binding_pattern(&self, target: &oxc::AssignmentTarget) -> Result<ast::BindingPattern, FrontendError> {
        match target {
            oxc::AssignmentTarget::ArrayAssignmentTarget(array) => {
                let mut elements = Vec::with_capacity(array.elements.len());
                for element in &array.elements {
                    elements.push(match element {
                        None => None,
                        Some(el) => Some(ast::BindingElement { pattern: self.assignment_target_maybe_default(el)?, default: None, is_rest: false }),
                    });
                }
                if let Some(rest) = &array.rest {
                    elements.push(Some(ast::BindingElement { pattern: simple_assignment_target_as_pattern(&rest.target)?, default: None, is_rest: true }));
                }
                Ok(ast::BindingPattern::Array(elements))
            }
            oxc::AssignmentTarget::ObjectAssignmentTarget(object) => {
                let mut props = Vec::with_capacity(object.properties.len());
                for prop in &object.properties {
                    match prop {
                        oxc::AssignmentTargetProperty::AssignmentTargetPropertyIdentifier(p) => {
                            props.push(ast::ObjectBindingProp {
                                key: ast::PropertyKeyExpr::Identifier(p.binding.name.as_str().to_string()),
                                value: ast::BindingPattern::Identifier(p.binding.name.as_str().to_string()),
                                default: p.init.as_ref().map(|e| self.lower_expression(e)).transpose()?,
                                is_rest: false,
                            });
                        }
                        oxc::AssignmentTargetProperty::AssignmentTargetPropertyProperty(p) => {
                            props.push(ast::ObjectBindingProp {
                                key: self.lower_property_key(&p.name)?,
                                value: self.assignment_target_maybe_default(&p.binding)?,
                                default: None,
                                is_rest: false,
                            });
                        }
                    }
                }
                let rest = object.rest.as_ref().map(|r| simple_assignment_target_as_identifier(&r.target)).transpose()?;
                Ok(ast::BindingPattern::Object(props, rest))
            }
            _ => {
                let simple = target.as_simple_assignment_target().expect("non-pattern AssignmentTarget is always simple");
                simple_assignment_target_as_pattern(simple)
            }
        }
    }

    fn assignment_target_maybe_default(&self, target: &oxc::AssignmentTargetMaybeDefault) -> Result<ast::BindingPattern, FrontendError> {
        match target {
            oxc::AssignmentTargetMaybeDefault::AssignmentTargetWithDefault(_) => {
                Err(FrontendError::Unsupported("default in destructuring for-of/for-in target"))
            }
            _ => {
                let simple = target.as_assignment_target().expect("non-default AssignmentTargetMaybeDefault is always a plain target");
                self.assignment_target_as_binding_pattern(simple)
            }
        }
    }

    // ==================================================================
    // Functions and classes
    // ==================================================================

    fn lower_function(&self, function: &oxc::Function, is_arrow: bool) -> Result<ast::Function, FrontendError> {
        let name = function.id.as_ref().map(|id| id.name.as_str().to_string());
        let params = self.lower_formal_parameters(&function.params)?;
        let body = function.body.as_ref().expect("a Function statement/expression always has a body (no TS overload declarations)");
        Ok(ast::Function {
            name,
            params,
            body: ast::FunctionBody::Block(self.lower_statements(&body.statements)?),
            is_generator: function.generator,
            is_async: function.r#async,
            is_arrow,
            strict: has_use_strict_directive(&body.directives),
            source_text: self.span_text(function.span),
        })
    }

    fn lower_arrow_function(&self, function: &oxc::ArrowFunctionExpression) -> Result<ast::Function, FrontendError> {
        let params = self.lower_formal_parameters(&function.params)?;
        let body = if function.expression {
            let only = function.body.statements.first().expect("a concise arrow body lowers to exactly one ExpressionStatement");
            let oxc::Statement::ExpressionStatement(expr_stmt) = only else {
                return Err(FrontendError::Unsupported("malformed concise arrow body"));
            };
            ast::FunctionBody::Expression(Box::new(self.lower_expression(&expr_stmt.expression)?))
        } else {
            ast::FunctionBody::Block(self.lower_statements(&function.body.statements)?)
        };
        Ok(ast::Function {
            name: None,
            params,
            body,
            is_generator: false,
            is_async: function.r#async,
            is_arrow: true,
            strict: false,
            source_text: self.span_text(function.span),
        })
    }

    /// Drops each parameter's own top-level default/rest — see the module
    /// doc comment for why `crate::ast::Function.params` can't carry them.
    fn lower_formal_parameters(&self, params: &oxc::FormalParameters) -> Result<Vec<ast::BindingPattern>, FrontendError> {
        params.items.iter().map(|p| self.lower_binding_pattern(&p.pattern)).collect()
    }

    fn lower_class(&self, class: &oxc::Class) -> Result<ast::ClassDef, FrontendError> {
        let name = class.id.as_ref().map(|id| id.name.as_str().to_string());
        let super_class = class.super_class.as_ref().map(|e| self.lower_expression(e)).transpose()?;
        let mut constructor = None;
        let mut methods = Vec::new();
        let mut fields = Vec::new();
        for element in &class.body.body {
            match element {
                oxc::ClassElement::MethodDefinition(method) => {
                    let function = Rc::new(self.lower_function(&method.value, false)?);
                    if method.kind == oxc::MethodDefinitionKind::Constructor {
                        constructor = Some(function);
                        continue;
                    }
                    let key = self.lower_property_key(&method.key)?;
                    let kind = match method.kind {
                        oxc::MethodDefinitionKind::Get => ast::MethodKind::Get,
                        oxc::MethodDefinitionKind::Set => ast::MethodKind::Set,
                        _ => ast::MethodKind::Method,
                    };
                    methods.push(ast::ClassMethod { key, kind, is_static: method.r#static, function });
                }
                oxc::ClassElement::PropertyDefinition(field) => {
                    let key = self.lower_property_key(&field.key)?;
                    let value = field.value.as_ref().map(|e| self.lower_expression(e)).transpose()?;
                    fields.push(ast::ClassField { key, is_static: field.r#static, value });
                }
                oxc::ClassElement::StaticBlock(_) => return Err(FrontendError::Unsupported("static initialization blocks")),
                oxc::ClassElement::AccessorProperty(_) => return Err(FrontendError::Unsupported("auto-accessor class fields")),
                oxc::ClassElement::TSIndexSignature(_) => return Err(FrontendError::Unsupported("TypeScript syntax")),
            }
        }
        Ok(ast::ClassDef { name, super_class, constructor, methods, fields, source_text: self.span_text(class.span) })
    }

    // ==================================================================
    // Expressions
    // ==================================================================

    fn lower_expression(&self, expr: &oxc::Expression) -> Result<ast::Expression, FrontendError> {
        Ok(match expr {
            oxc::Expression::BooleanLiteral(l) => ast::Expression::Literal(ast::Literal::Boolean(l.value)),
            oxc::Expression::NullLiteral(_) => ast::Expression::Literal(ast::Literal::Null),
            oxc::Expression::NumericLiteral(l) => ast::Expression::Literal(ast::Literal::Number(l.value)),
            oxc::Expression::BigIntLiteral(l) => ast::Expression::Literal(ast::Literal::BigInt(l.raw.as_str().to_string())),
            oxc::Expression::StringLiteral(l) => ast::Expression::Literal(ast::Literal::String(l.value.as_str().to_string())),
            oxc::Expression::RegExpLiteral(_) => return Err(FrontendError::Unsupported("regular expression literals")),
            oxc::Expression::TemplateLiteral(l) => self.lower_template_literal(l)?,
            oxc::Expression::Identifier(id) => ast::Expression::Identifier(id.name.as_str().to_string()),
            oxc::Expression::Super(_) => ast::Expression::Super,
            oxc::Expression::ThisExpression(_) => ast::Expression::This,
            oxc::Expression::MetaProperty(m) => {
                if m.meta.name == "new" && m.property.name == "target" {
                    ast::Expression::NewTarget
                } else {
                    return Err(FrontendError::Unsupported("import.meta"));
                }
            }
            oxc::Expression::ArrayExpression(a) => ast::Expression::Array(a.elements.iter().map(|e| self.lower_array_element(e)).collect::<Result<_, _>>()?),
            oxc::Expression::ObjectExpression(o) => ast::Expression::Object(o.properties.iter().map(|p| self.lower_object_property(p)).collect::<Result<_, _>>()?),
            oxc::Expression::FunctionExpression(f) => ast::Expression::Function(Rc::new(self.lower_function(f, false)?)),
            oxc::Expression::ArrowFunctionExpression(f) => ast::Expression::Function(Rc::new(self.lower_arrow_function(f)?)),
            oxc::Expression::ClassExpression(c) => ast::Expression::Class(Rc::new(self.lower_class(c)?)),
            oxc::Expression::UnaryExpression(u) => ast::Expression::Unary { op: lower_unary_op(u.operator), argument: Box::new(self.lower_expression(&u.argument)?) },
            oxc::Expression::UpdateExpression(u) => ast::Expression::Update {
                op: if u.operator == oxc::UpdateOperator::Increment { ast::UpdateOp::Increment } else { ast::UpdateOp::Decrement },
                argument: Box::new(self.simple_target_expression(&u.argument)?),
                prefix: u.prefix,
            },
            oxc::Expression::BinaryExpression(b) => {
                ast::Expression::Binary { op: lower_binary_op(b.operator), left: Box::new(self.lower_expression(&b.left)?), right: Box::new(self.lower_expression(&b.right)?) }
            }
            oxc::Expression::LogicalExpression(l) => {
                ast::Expression::Logical { op: lower_logical_op(l.operator), left: Box::new(self.lower_expression(&l.left)?), right: Box::new(self.lower_expression(&l.right)?) }
            }
            oxc::Expression::AssignmentExpression(a) => ast::Expression::Assignment {
                op: lower_assign_op(a.operator),
                target: Box::new(self.assignment_target_expression(&a.left)?),
                value: Box::new(self.lower_expression(&a.right)?),
            },
            oxc::Expression::ConditionalExpression(c) => ast::Expression::Conditional {
                test: Box::new(self.lower_expression(&c.test)?),
                consequent: Box::new(self.lower_expression(&c.consequent)?),
                alternate: Box::new(self.lower_expression(&c.alternate)?),
            },
            oxc::Expression::CallExpression(c) => {
                if let oxc::Expression::Super(_) = &c.callee {
                    ast::Expression::SuperCall { arguments: c.arguments.iter().map(|a| self.lower_argument(a)).collect::<Result<_, _>>()? }
                } else {
                    ast::Expression::Call {
                        callee: Box::new(self.lower_expression(&c.callee)?),
                        arguments: c.arguments.iter().map(|a| self.lower_argument(a)).collect::<Result<_, _>>()?,
                        optional: c.optional,
                    }
                }
            }
            oxc::Expression::NewExpression(n) => {
                ast::Expression::New { callee: Box::new(self.lower_expression(&n.callee)?), arguments: n.arguments.iter().map(|a| self.lower_argument(a)).collect::<Result<_, _>>()? }
            }
            oxc::Expression::ComputedMemberExpression(m) => self.lower_computed_member(m)?,
            oxc::Expression::StaticMemberExpression(m) => self.lower_static_member(m)?,
            oxc::Expression::PrivateFieldExpression(m) => self.lower_private_field(m)?,
            oxc::Expression::ChainExpression(c) => self.lower_chain_element(&c.expression)?,
            oxc::Expression::SequenceExpression(s) => ast::Expression::Sequence(s.expressions.iter().map(|e| self.lower_expression(e)).collect::<Result<_, _>>()?),
            oxc::Expression::YieldExpression(y) => {
                ast::Expression::Yield { argument: y.argument.as_ref().map(|e| self.lower_expression(e)).transpose()?.map(Box::new), delegate: y.delegate }
            }
            oxc::Expression::AwaitExpression(a) => ast::Expression::Await { argument: Box::new(self.lower_expression(&a.argument)?) },
            oxc::Expression::ParenthesizedExpression(p) => self.lower_expression(&p.expression)?,
            oxc::Expression::PrivateInExpression(p) => ast::Expression::Binary {
                op: ast::BinaryOp::In,
                left: Box::new(ast::Expression::Literal(ast::Literal::String(format!("#{}", p.left.name.as_str())))),
                right: Box::new(self.lower_expression(&p.right)?),
            },
            oxc::Expression::TaggedTemplateExpression(_) => return Err(FrontendError::Unsupported("tagged templates")),
            oxc::Expression::ImportExpression(_) => return Err(FrontendError::Unsupported("dynamic import")),
            oxc::Expression::V8IntrinsicExpression(_) => return Err(FrontendError::Unsupported("V8 intrinsics")),
            _ => return Err(FrontendError::Unsupported("TypeScript/JSX syntax")),
        })
    }

    fn lower_template_literal(&self, template: &oxc::TemplateLiteral) -> Result<ast::Expression, FrontendError> {
        let quasis = template.quasis.iter().map(|q| q.value.cooked.as_ref().map(|c| c.as_str().to_string()).unwrap_or_default()).collect();
        let expressions = template.expressions.iter().map(|e| self.lower_expression(e)).collect::<Result<_, _>>()?;
        Ok(ast::Expression::Template { quasis, expressions })
    }

    fn lower_array_element(&self, element: &oxc::ArrayExpressionElement) -> Result<ast::ArrayElement, FrontendError> {
        match element {
            oxc::ArrayExpressionElement::Elision(_) => Ok(ast::ArrayElement::Elision),
            oxc::ArrayExpressionElement::SpreadElement(s) => Ok(ast::ArrayElement::Spread(self.lower_expression(&s.argument)?)),
            _ => {
                let expr = element.as_expression().expect("non-spread, non-elision ArrayExpressionElement is always an expression variant");
                Ok(ast::ArrayElement::Expression(self.lower_expression(expr)?))
            }
        }
    }

    fn lower_argument(&self, argument: &oxc::Argument) -> Result<ast::Argument, FrontendError> {
        match argument {
            oxc::Argument::SpreadElement(s) => Ok(ast::Argument::Spread(self.lower_expression(&s.argument)?)),
            _ => {
                let expr = argument.as_expression().expect("non-spread Argument is always an expression variant");
                Ok(ast::Argument::Expression(self.lower_expression(expr)?))
            }
        }
    }

    fn lower_object_property(&self, prop: &oxc::ObjectPropertyKind) -> Result<ast::PropertyDef, FrontendError> {
        match prop {
            oxc::ObjectPropertyKind::SpreadProperty(s) => Ok(ast::PropertyDef::Spread(self.lower_expression(&s.argument)?)),
            oxc::ObjectPropertyKind::ObjectProperty(p) => {
                let key = self.lower_property_key(&p.key)?;
                match p.kind {
                    oxc::PropertyKind::Init => {
                        if let oxc::Expression::FunctionExpression(f) = &p.value {
                            if f.generator || f.r#async {
                                return Ok(ast::PropertyDef::Method { key, kind: ast::MethodKind::Method, function: Rc::new(self.lower_function(f, false)?) });
                            }
                        }
                        Ok(ast::PropertyDef::KeyValue { key, value: self.lower_expression(&p.value)?, shorthand: p.shorthand })
                    }
                    oxc::PropertyKind::Get | oxc::PropertyKind::Set => {
                        let oxc::Expression::FunctionExpression(f) = &p.value else {
                            return Err(FrontendError::Unsupported("malformed accessor property"));
                        };
                        let kind = if p.kind == oxc::PropertyKind::Get { ast::MethodKind::Get } else { ast::MethodKind::Set };
                        Ok(ast::PropertyDef::Method { key, kind, function: Rc::new(self.lower_function(f, false)?) })
                    }
                }
            }
        }
    }

    fn lower_computed_member(&self, member: &oxc::ComputedMemberExpression) -> Result<ast::Expression, FrontendError> {
        let property = ast::MemberProperty::Computed(Box::new(self.lower_expression(&member.expression)?));
        Ok(if let oxc::Expression::Super(_) = &member.object {
            ast::Expression::SuperMember { property }
        } else {
            ast::Expression::Member { object: Box::new(self.lower_expression(&member.object)?), property, optional: member.optional }
        })
    }

    fn lower_static_member(&self, member: &oxc::StaticMemberExpression) -> Result<ast::Expression, FrontendError> {
        let property = ast::MemberProperty::Identifier(member.property.name.as_str().to_string());
        Ok(if let oxc::Expression::Super(_) = &member.object {
            ast::Expression::SuperMember { property }
        } else {
            ast::Expression::Member { object: Box::new(self.lower_expression(&member.object)?), property, optional: member.optional }
        })
    }

    fn lower_private_field(&self, member: &oxc::PrivateFieldExpression) -> Result<ast::Expression, FrontendError> {
        let property = ast::MemberProperty::PrivateName(member.field.name.as_str().to_string());
        Ok(if let oxc::Expression::Super(_) = &member.object {
            ast::Expression::SuperMember { property }
        } else {
            ast::Expression::Member { object: Box::new(self.lower_expression(&member.object)?), property, optional: member.optional }
        })
    }

    /// `ChainElement` is an optional-chaining-aware call/member node; each
    /// element already carries its own `optional` flag (on the object/callee,
    /// same as the non-chained variants), so lowering just unwraps it — the
    /// evaluator's own per-link short-circuit (see `eval_call`) reads those
    /// flags the same way either source shape produces them.
    fn lower_chain_element(&self, element: &oxc::ChainElement) -> Result<ast::Expression, FrontendError> {
        match element {
            oxc::ChainElement::CallExpression(c) => Ok(ast::Expression::Call {
                callee: Box::new(self.lower_expression(&c.callee)?),
                arguments: c.arguments.iter().map(|a| self.lower_argument(a)).collect::<Result<_, _>>()?,
                optional: c.optional,
            }),
            oxc::ChainElement::ComputedMemberExpression(m) => self.lower_computed_member(m),
            oxc::ChainElement::StaticMemberExpression(m) => self.lower_static_member(m),
            oxc::ChainElement::PrivateFieldExpression(m) => self.lower_private_field(m),
            _ => Err(FrontendError::Unsupported("TypeScript non-null assertion")),
        }
    }

    /// The argument of `++`/`--` is always a simple reference (identifier or
    /// member expression), never a destructuring pattern — lowered as a
    /// plain expression the same way a non-destructuring assignment target
    /// is.
    fn simple_target_expression(&self, expr: &oxc::SimpleAssignmentTarget) -> Result<ast::Expression, FrontendError> {
        match expr {
            oxc::SimpleAssignmentTarget::AssignmentTargetIdentifier(id) => Ok(ast::Expression::Identifier(id.name.as_str().to_string())),
            _ => {
                let member = expr.as_member_expression().expect("non-identifier SimpleAssignmentTarget is always a member expression");
                self.lower_member_expression(member)
            }
        }
    }

    fn lower_member_expression(&self, member: &oxc::MemberExpression) -> Result<ast::Expression, FrontendError> {
        match member {
            oxc::MemberExpression::ComputedMemberExpression(m) => self.lower_computed_member(m),
            oxc::MemberExpression::StaticMemberExpression(m) => self.lower_static_member(m),
            oxc::MemberExpression::PrivateFieldExpression(m) => self.lower_private_field(m),
        }
    }

    /// The left-hand side of a plain (non-destructuring) assignment or the
    /// `for`-target position, as a general expression — `ast::Expression`
    /// doubles as the assignment-target representation (see
    /// `syntax_directed_operations::evaluation::destructuring_assignment`),
    /// so an `[a, b]`/`{a, b}` target lowers through the ordinary
    /// array/object literal path, with per-element defaults folded into
    /// nested `Expression::Assignment { op: Assign, .. }` nodes to match
    /// what that function expects.
    fn assignment_target_expression(&self, target: &oxc::AssignmentTarget) -> Result<ast::Expression, FrontendError> {
        match target {
            oxc::AssignmentTarget::ArrayAssignmentTarget(array) => {
                let mut elements = Vec::with_capacity(array.elements.len());
                for element in &array.elements {
                    elements.push(match element {
                        None => ast::ArrayElement::Elision,
                        Some(el) => ast::ArrayElement::Expression(self.assignment_target_maybe_default_expression(el)?),
                    });
                }
                if let Some(rest) = &array.rest {
                    elements.push(ast::ArrayElement::Spread(self.simple_target_expression(&rest.target)?));
                }
                Ok(ast::Expression::Array(elements))
            }
            oxc::AssignmentTarget::ObjectAssignmentTarget(object) => {
                let mut props = Vec::with_capacity(object.properties.len());
                for prop in &object.properties {
                    match prop {
                        oxc::AssignmentTargetProperty::AssignmentTargetPropertyIdentifier(p) => {
                            let name = p.binding.name.as_str().to_string();
                            let value = match &p.init {
                                Some(default) => ast::Expression::Assignment {
                                    op: ast::AssignOp::Assign,
                                    target: Box::new(ast::Expression::Identifier(name)),
                                    value: Box::new(self.lower_expression(default)?),
                                },
                                None => ast::Expression::Identifier(name),
                            };
                            props.push(ast::PropertyDef::KeyValue { key: ast::PropertyKeyExpr::Identifier(p.binding.name.as_str().to_string()), value, shorthand: true });
                        }
                        oxc::AssignmentTargetProperty::AssignmentTargetPropertyProperty(p) => {
                            let key = self.lower_property_key(&p.name)?;
                            let value = self.assignment_target_maybe_default_expression(&p.binding)?;
                            props.push(ast::PropertyDef::KeyValue { key, value, shorthand: false });
                        }
                    }
                }
                if let Some(rest) = &object.rest {
                    props.push(ast::PropertyDef::Spread(self.simple_target_expression(&rest.target)?));
                }
                Ok(ast::Expression::Object(props))
            }
            _ => {
                let simple = target.as_simple_assignment_target().expect("non-pattern AssignmentTarget is always simple");
                self.simple_target_expression(simple)
            }
        }
    }

    fn assignment_target_maybe_default_expression(&self, target: &oxc::AssignmentTargetMaybeDefault) -> Result<ast::Expression, FrontendError> {
        match target {
            oxc::AssignmentTargetMaybeDefault::AssignmentTargetWithDefault(d) => Ok(ast::Expression::Assignment {
                op: ast::AssignOp::Assign,
                target: Box::new(self.assignment_target_expression(&d.binding)?),
                value: Box::new(self.lower_expression(&d.init)?),
            }),
            _ => {
                let plain = target.as_assignment_target().expect("non-default AssignmentTargetMaybeDefault is always a plain target");
                self.assignment_target_expression(plain)
            }
        }
    }
}

fn lower_var_kind(kind: oxc::VariableDeclarationKind) -> ast::VarKind {
    match kind {
        oxc::VariableDeclarationKind::Var => ast::VarKind::Var,
        oxc::VariableDeclarationKind::Let => ast::VarKind::Let,
        oxc::VariableDeclarationKind::Const => ast::VarKind::Const,
        // `using`/`await using` declarations have no disposal-stack semantics
        // in this crate (no explicit-resource-management support); treated
        // as plain `let` bindings.
        _ => ast::VarKind::Let,
    }
}

fn simple_rest_name(pattern: &oxc::BindingPattern) -> Result<String, FrontendError> {
    match &pattern.kind {
        oxc::BindingPatternKind::BindingIdentifier(id) => Ok(id.name.as_str().to_string()),
        _ => Err(FrontendError::Unsupported("destructured rest element")),
    }
}

fn simple_assignment_target_as_pattern(target: &oxc::SimpleAssignmentTarget) -> Result<ast::BindingPattern, FrontendError> {
    match target {
        oxc::SimpleAssignmentTarget::AssignmentTargetIdentifier(id) => Ok(ast::BindingPattern::Identifier(id.name.as_str().to_string())),
        _ => Err(FrontendError::Unsupported("member expression in destructuring for-of/for-in target")),
    }
}

fn simple_assignment_target_as_identifier(target: &oxc::SimpleAssignmentTarget) -> Result<String, FrontendError> {
    match target {
        oxc::SimpleAssignmentTarget::AssignmentTargetIdentifier(id) => Ok(id.name.as_str().to_string()),
        _ => Err(FrontendError::Unsupported("non-identifier rest target")),
    }
}

fn lower_unary_op(op: oxc::UnaryOperator) -> ast::UnaryOp {
    match op {
        oxc::UnaryOperator::UnaryNegation => ast::UnaryOp::Minus,
        oxc::UnaryOperator::UnaryPlus => ast::UnaryOp::Plus,
        oxc::UnaryOperator::LogicalNot => ast::UnaryOp::Not,
        oxc::UnaryOperator::BitwiseNot => ast::UnaryOp::BitNot,
        oxc::UnaryOperator::Typeof => ast::UnaryOp::TypeOf,
        oxc::UnaryOperator::Void => ast::UnaryOp::Void,
        oxc::UnaryOperator::Delete => ast::UnaryOp::Delete,
    }
}

fn lower_binary_op(op: oxc::BinaryOperator) -> ast::BinaryOp {
    use oxc::BinaryOperator as B;
    match op {
        B::Addition => ast::BinaryOp::Add,
        B::Subtraction => ast::BinaryOp::Sub,
        B::Multiplication => ast::BinaryOp::Mul,
        B::Division => ast::BinaryOp::Div,
        B::Remainder => ast::BinaryOp::Mod,
        B::Exponential => ast::BinaryOp::Exp,
        B::ShiftLeft => ast::BinaryOp::ShiftLeft,
        B::ShiftRight => ast::BinaryOp::ShiftRight,
        B::ShiftRightZeroFill => ast::BinaryOp::ShiftRightUnsigned,
        B::BitwiseAnd => ast::BinaryOp::BitAnd,
        B::BitwiseOR => ast::BinaryOp::BitOr,
        B::BitwiseXOR => ast::BinaryOp::BitXor,
        B::Equality => ast::BinaryOp::Equal,
        B::Inequality => ast::BinaryOp::NotEqual,
        B::StrictEquality => ast::BinaryOp::StrictEqual,
        B::StrictInequality => ast::BinaryOp::StrictNotEqual,
        B::LessThan => ast::BinaryOp::LessThan,
        B::LessEqualThan => ast::BinaryOp::LessEqual,
        B::GreaterThan => ast::BinaryOp::GreaterThan,
        B::GreaterEqualThan => ast::BinaryOp::GreaterEqual,
        B::In => ast::BinaryOp::In,
        B::Instanceof => ast::BinaryOp::Instanceof,
    }
}

fn lower_logical_op(op: oxc::LogicalOperator) -> ast::LogicalOp {
    match op {
        oxc::LogicalOperator::And => ast::LogicalOp::And,
        oxc::LogicalOperator::Or => ast::LogicalOp::Or,
        oxc::LogicalOperator::Coalesce => ast::LogicalOp::Coalesce,
    }
}

fn lower_assign_op(op: oxc::AssignmentOperator) -> ast::AssignOp {
    use oxc::AssignmentOperator as A;
    match op {
        A::Assign => ast::AssignOp::Assign,
        A::Addition => ast::AssignOp::Add,
        A::Subtraction => ast::AssignOp::Sub,
        A::Multiplication => ast::AssignOp::Mul,
        A::Division => ast::AssignOp::Div,
        A::Remainder => ast::AssignOp::Mod,
        A::Exponential => ast::AssignOp::Exp,
        A::ShiftLeft => ast::AssignOp::ShiftLeft,
        A::ShiftRight => ast::AssignOp::ShiftRight,
        A::ShiftRightZeroFill => ast::AssignOp::ShiftRightUnsigned,
        A::BitwiseAnd => ast::AssignOp::BitAnd,
        A::BitwiseOR => ast::AssignOp::BitOr,
        A::BitwiseXOR => ast::AssignOp::BitXor,
        A::LogicalAnd => ast::AssignOp::LogicalAnd,
        A::LogicalOr => ast::AssignOp::LogicalOr,
        A::LogicalNullish => ast::AssignOp::Coalesce,
    }
}
