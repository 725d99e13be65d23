// -- < Testing program resources > ---------------------------
#[cfg(test)]
pub mod program_test {
    use crate::prelude::*;

    use super::super::shared_shaders::shaders::*;

    #[test]
    fn test_link_and_activate() {
        let (backend, context) = headless_context();
        let program = linked_program(&context);

        assert_eq!(program.state(), ProgramState::Linked);
        assert!(program.handle().is_valid());
        assert!(!program.is_active());

        program.activate();
        assert_eq!(context.current_program(), Some(program.handle()));
        assert!(program.is_active());
        assert_eq!(backend.stats().invalid_calls, 0);
    }

    #[test]
    fn test_link_detaches_shaders() {
        let (backend, context) = headless_context();
        let program = linked_program(&context);

        assert!(backend.attached_shaders(program.handle()).is_empty());
        // Shaders were dropped by the helper, the program keeps working
        assert_eq!(backend.live_shaders(), 0);
        program.activate();
        assert!(program.is_active());
    }

    #[test]
    fn test_link_failure_reports_info_log() {
        let (backend, context) = headless_context();
        let vertex = ShaderObject::compile(&context, ShaderStage::Vertex, VERTEX_SOURCE).unwrap();
        let fragment =
            ShaderObject::compile(&context, ShaderStage::Fragment, MISMATCHED_FRAGMENT_SOURCE)
                .unwrap();

        let mut program = ProgramResource::new(&context);
        let handle = program.handle();
        match program.link(&[&vertex, &fragment]) {
            Err(ProgramError::Link(info_log)) => {
                assert!(
                    info_log.contains("texture_coords"),
                    "Info log should name the unresolved input: {info_log}"
                );
            }
            other => panic!("Expected a link error, got {:?}", other),
        }
        assert_eq!(program.state(), ProgramState::LinkFailed);
        assert!(backend.attached_shaders(handle).is_empty());

        drop(program);
        assert!(!backend.is_program_live(handle));
        assert_eq!(backend.stats().programs_deleted, 1);
        assert_eq!(backend.stats().invalid_calls, 0);
    }

    #[test]
    fn test_relink_after_failure() {
        let (_backend, context) = headless_context();
        let (vertex, fragment) = compile_stages(&context);
        let broken =
            ShaderObject::compile(&context, ShaderStage::Fragment, MISMATCHED_FRAGMENT_SOURCE)
                .unwrap();

        let mut program = ProgramResource::new(&context);
        assert!(program.link(&[&vertex, &broken]).is_err());
        assert_eq!(program.state(), ProgramState::LinkFailed);

        program
            .link(&[&vertex, &fragment])
            .expect("Fixed shaders should link");
        assert_eq!(program.state(), ProgramState::Linked);
        assert!(program.get_uniform("color").is_active());
    }

    #[test]
    fn test_linked_program_rejects_relink() {
        let (backend, context) = headless_context();
        let (vertex, fragment) = compile_stages(&context);

        let mut program = ProgramResource::new(&context);
        program.link(&[&vertex, &fragment]).unwrap();
        let color = program.get_uniform("color");

        assert!(matches!(
            program.link(&[&vertex, &fragment]),
            Err(ProgramError::AlreadyLinked(handle)) if handle == program.handle()
        ));
        assert_eq!(backend.stats().link_calls, 1);
        assert_eq!(program.state(), ProgramState::Linked);
        assert_eq!(program.get_uniform("color"), color);
    }

    #[test]
    fn test_link_without_shaders() {
        let (backend, context) = headless_context();
        let mut program = ProgramResource::new(&context);

        assert!(matches!(program.link(&[]), Err(ProgramError::NoShaders)));
        assert_eq!(program.state(), ProgramState::Empty);
        assert_eq!(backend.stats().link_calls, 0);
    }

    #[test]
    fn test_uniform_lookup_is_cached() {
        let (backend, context) = headless_context();
        let mut program = linked_program(&context);

        let first = program.get_uniform("view_projection");
        let second = program.get_uniform("view_projection");

        assert_eq!(first, second);
        assert!(first.is_active());
        assert_eq!(first.program(), program.handle());
        assert_eq!(backend.stats().uniform_queries, 1);
    }

    #[test]
    fn test_absent_names_are_cached() {
        let (backend, context) = headless_context();
        let mut program = linked_program(&context);

        let missing = program.get_uniform("missing");
        assert!(!missing.is_active());
        assert_eq!(program.get_uniform("missing"), missing);
        assert_eq!(backend.stats().uniform_queries, 1);

        assert_eq!(program.get_attribute("unused"), None);
        assert_eq!(program.get_attribute("unused"), None);
        assert_eq!(backend.stats().attribute_queries, 1);
    }

    #[test]
    fn test_lookup_before_link_is_not_cached() {
        let (backend, context) = headless_context();
        let (vertex, fragment) = compile_stages(&context);
        let mut program = ProgramResource::new(&context);

        assert!(!program.get_uniform("color").is_active());
        assert_eq!(program.get_attribute("position"), None);
        assert_eq!(backend.stats().uniform_queries, 0);
        assert_eq!(backend.stats().attribute_queries, 0);

        program.link(&[&vertex, &fragment]).unwrap();
        assert!(program.get_uniform("color").is_active());
        assert_eq!(program.get_attribute("position"), Some(0));
    }

    #[test]
    fn test_activation_last_writer_wins() {
        let (_backend, context) = headless_context();
        let first = linked_program(&context);
        let second = linked_program(&context);
        assert_ne!(first.handle(), second.handle());

        first.activate();
        second.activate();
        assert_eq!(context.current_program(), Some(second.handle()));
        assert!(!first.is_active());

        context.deactivate_program();
        assert_eq!(context.current_program(), None);
        assert!(!second.is_active());
    }

    #[test]
    fn test_drop_releases_handle_once() {
        let (backend, context) = headless_context();
        let mut program = linked_program(&context);
        let handle = program.handle();

        for _ in 0..10 {
            program.get_uniform("color");
            program.get_uniform("missing");
            program.get_attribute("position");
        }
        drop(program);

        let stats = backend.stats();
        assert_eq!(stats.programs_created, 1);
        assert_eq!(stats.programs_deleted, 1);
        assert_eq!(stats.invalid_calls, 0);
        assert!(!backend.is_program_live(handle));
        assert_eq!(backend.live_programs(), 0);
    }

    #[test]
    fn test_move_transfers_ownership() {
        let (backend, context) = headless_context();
        let program = linked_program(&context);
        let handle = program.handle();

        let mut programs = Vec::new();
        programs.push(program);
        assert!(backend.is_program_live(handle));

        programs.clear();
        assert_eq!(backend.stats().programs_deleted, 1);
        assert_eq!(backend.stats().invalid_calls, 0);
    }

    #[test]
    fn test_empty_program_drop() {
        let (backend, context) = headless_context();
        drop(ProgramResource::new(&context));

        assert_eq!(backend.live_programs(), 0);
        assert_eq!(backend.stats().invalid_calls, 0);
    }

    #[test]
    fn test_vertex_attribute_and_color_uniform() {
        let (backend, context) = headless_context();
        let mut program = linked_program(&context);

        assert_eq!(program.get_attribute("position"), Some(0));
        assert_eq!(program.get_attribute("unused"), None);

        let color = program.get_uniform("color");
        assert!(color.is_active());
        let queries = backend.stats().uniform_queries;
        assert_eq!(program.get_uniform("color"), color);
        assert_eq!(backend.stats().uniform_queries, queries);
    }

    #[test]
    fn test_allocation_failure() {
        let (backend, context) = headless_context();
        backend.set_fail_allocations(true);

        assert!(matches!(
            ProgramResource::try_new(&context),
            Err(ProgramError::Allocation(_))
        ));
        assert_eq!(backend.live_programs(), 0);
    }

    #[test]
    #[should_panic(expected = "could not create program object")]
    fn test_allocation_failure_is_fatal() {
        let (backend, context) = headless_context();
        backend.set_fail_allocations(true);
        let _program = ProgramResource::new(&context);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "not linked")]
    fn test_activate_unlinked_program() {
        let (_backend, context) = headless_context();
        let program = ProgramResource::new(&context);
        program.activate();
    }
}
